//! Decorative space ASCII art shown next to the explanation

use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::SeedableRng;
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};

/// Palette the art is sprinkled with
const PALETTE: [Color; 4] = [
    Color::Rgb(0x5C, 0x5C, 0x5C), // muted
    Color::Rgb(0x4E, 0x8C, 0x8C), // cosmic teal
    Color::Rgb(0x8C, 0x6B, 0x4E), // stellar glow
    Color::Rgb(0x6B, 0x4E, 0x8C), // nebula purple
];

const SATURN: &str = r"
                 _____
              .-'     '-.
   .-------- /  .-. .-.  \ --------.
  (         |  (   Y   )  |         )
   '-------- \  '-' '-'  / --------'
              '-._____.-'
";

const ROCKET: &str = r"
       /\
      /  \
     |    |
     | () |
     |    |
    /|    |\
   / |    | \
  |__|____|__|
     /_\/_\
     *    *
    *  **  *
";

const MOON: &str = r"
        _..._
      .'   o '.
     :  o     o:
     :    O    :
      '. o   .'
        '-...-'
";

const STARFIELD: &str = r"
  *     .        +         .      *
     .       *        .        +
  .     +        .   *     .        .
     *      .       .         *
  +      .     *        +   .     .
";

const COMET: &str = r"
                           .
   *  .  .  . . . . . . . ( )
            .          '  ~
";

const TELESCOPE: &str = r"
            *     .
        .       __
      ____...--'  |
     [____...--'''
         /  \
        /    \
       /      \
";

const ASTRONAUT: &str = r"
        _____
       /     \
      | () () |
       \  ^  /
      __|||||__
     /  |===|  \
    |   |   |   |
        |___|
        /   \
";

const GALAXY: &str = r"
          .  *  .
      *   .-~~~-.   .
    .   .'  . *  '.   *
   *   /  *  @@  . \
       \ .  @@  *  /   .
    .   '.  *  . .'
      *   '-~~~-'   *
          .  .  *
";

/// Every piece of art, in no particular order
pub const ALL_ART: [&str; 8] = [SATURN, ROCKET, MOON, STARFIELD, COMET, TELESCOPE, ASTRONAUT, GALAXY];

/// Width in columns of the widest line of `art`
pub fn art_width(art: &str) -> usize {
    art.lines().map(|line| line.chars().count()).max().unwrap_or(0)
}

/// Number of lines of `art`, ignoring the leading newline of the raw literal
pub fn art_height(art: &str) -> usize {
    trim_art(art).lines().count()
}

fn trim_art(art: &str) -> &str {
    art.trim_start_matches('\n').trim_end()
}

/// Picks a random piece that fits in `width` x `height`, deterministic per seed
pub fn pick_art(width: usize, height: usize, seed: u64) -> Option<&'static str> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut candidates = ALL_ART;
    candidates.shuffle(&mut rng);
    candidates
        .into_iter()
        .find(|art| art_width(art) <= width && art_height(art) <= height)
}

/// Colours every non-space glyph with a random palette colour
pub fn colorize(art: &str, seed: u64) -> Vec<Line<'static>> {
    let mut rng = StdRng::seed_from_u64(seed);
    trim_art(art)
        .lines()
        .map(|line| {
            let spans: Vec<Span<'static>> = line
                .chars()
                .map(|c| {
                    if c.is_whitespace() {
                        Span::raw(c.to_string())
                    } else {
                        let color = *PALETTE.choose(&mut rng).unwrap_or(&Color::Gray);
                        Span::styled(c.to_string(), Style::default().fg(color))
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

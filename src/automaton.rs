//! Elementary cellular automata rendered as black and white mask rasters.

use image::{Rgba, RgbaImage};
use rand::Rng;

const ALIVE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const DEAD: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Rules whose space-time diagrams are neither empty nor trivially periodic.
pub const INTERESTING_RULES: [u8; 20] = [
    18, 22, 26, 30, 45, 54, 57, 60, 73, 75, 86, 89, 90, 101, 105, 110, 122, 126, 146, 150,
];

/// Next-state lookup for every `(left, middle, right)` neighbourhood.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rule {
    number: u8,
    table: [bool; 8],
}

impl Rule {
    /// Decodes a Wolfram rule number. Neighbourhoods are enumerated from `(false, false, false)`
    /// to `(true, true, true)` and take their output from the rule bits, least significant first.
    pub fn new(number: u8) -> Self {
        let mut table = [false; 8];
        for (idx, out) in table.iter_mut().enumerate() {
            *out = (number >> idx) & 1 == 1;
        }
        Rule { number, table }
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    #[inline]
    pub fn next(&self, left: bool, middle: bool, right: bool) -> bool {
        self.table[(left as usize) << 2 | (middle as usize) << 1 | right as usize]
    }
}

/// The generated space-time diagram, one row per generation.
pub type Grid = Vec<Vec<bool>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Automaton {
    pub width: u32,
    pub height: u32,
    pub rule: Rule,
    pub scale: u32,
}

impl Automaton {
    /// `scale` is clamped to at least 1.
    pub fn new(width: u32, height: u32, rule: u8, scale: u32) -> Self {
        Automaton {
            width,
            height,
            rule: Rule::new(rule),
            scale: scale.max(1),
        }
    }

    /// Dimensions in `300..500` (steps of 5), a rule from [`INTERESTING_RULES`] and a scale of 1 to 4.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let width = 300 + 5 * rng.gen_range(0..40);
        let height = 300 + 5 * rng.gen_range(0..40);
        let rule = INTERESTING_RULES[rng.gen_range(0..INTERESTING_RULES.len())];
        let scale = rng.gen_range(1..5);
        Automaton::new(width, height, rule, scale)
    }

    pub fn describe(&self) -> String {
        format!(
            "Width: {}||Height: {}||Rule #: {}||Scale: {}",
            self.width,
            self.height,
            self.rule.number(),
            self.scale
        )
    }

    /// Runs the automaton for `height` generations from a random first row. The two edge cells of
    /// each later row have no full neighbourhood and are drawn at random as well.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Grid {
        let width = self.width as usize;
        let mut grid: Grid = Vec::with_capacity(self.height as usize);
        if self.height == 0 {
            return grid;
        }
        grid.push((0..width).map(|_| rng.gen()).collect());
        for y in 1..self.height as usize {
            let above = &grid[y - 1];
            let row: Vec<bool> = (0..width)
                .map(|x| {
                    if x == 0 || x + 1 == width {
                        rng.gen()
                    } else {
                        self.rule.next(above[x - 1], above[x], above[x + 1])
                    }
                })
                .collect();
            grid.push(row);
        }
        grid
    }

    /// Draws `grid` at `width` x `height`, every cell covering a `scale` sized square.
    pub fn render(&self, grid: &Grid) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let cell = grid
                .get((y / self.scale) as usize)
                .and_then(|row| row.get((x / self.scale) as usize))
                .copied()
                .unwrap_or(false);
            if cell {
                ALIVE
            } else {
                DEAD
            }
        })
    }
}

//! Quotes shown by overlays in quote mode and by the manager's "random quote".

use rand::Rng;

pub const QUOTES: &[&str] = &[
    "life is like a box of chocolates, you never know what you're going to get.",
    "success is falling nine times and getting up ten.",
    "today's effort buys tomorrow's freedom.",
    "well begun is half done.",
    "a journey of a thousand miles begins with a single step.",
];

/// Index of a random quote.
pub fn random_index() -> usize {
    rand::thread_rng().gen_range(0..QUOTES.len())
}

pub fn random_quote() -> &'static str {
    QUOTES[random_index()]
}

/// Quote at `index`, wrapping out-of-range indices.
pub fn quote(index: usize) -> &'static str {
    QUOTES[index % QUOTES.len()]
}

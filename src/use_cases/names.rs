// Nickname generation for bots filling a team roster.

use crate::domain::Team;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generate a random bot nickname, e.g. "Frosty Penguin".
pub fn bot_name(rng: &mut impl Rng) -> String {
    let adjective = ADJECTIVES[rng.random_range(0..ADJECTIVES.len())];
    let noun = NOUNS[rng.random_range(0..NOUNS.len())];
    format!("{adjective} {noun}")
}

/// Name generator suitable for `GameEngine::fill_teams_to_quota`.
pub fn bot_name_generator() -> impl FnMut(Team) -> String + Send {
    let mut rng = StdRng::from_rng(&mut rand::rng());
    move |_team| bot_name(&mut rng)
}

static ADJECTIVES: &[&str] = &[
    "Frosty", "Chilly", "Icy", "Snowy", "Brisk", "Nippy", "Polar", "Arctic", "Wintry", "Sleety",
    "Glacial", "Crisp", "Fluffy", "Speedy", "Sneaky", "Bold",
];

static NOUNS: &[&str] = &[
    "Penguin", "Yeti", "Walrus", "Otter", "Fox", "Owl", "Hare", "Seal", "Moose", "Lynx",
    "Snowman", "Icicle", "Blizzard", "Flurry", "Avalanche", "Mitten",
];

//! Typed records shared by every pass

pub mod card;
pub mod deck;
pub mod stratagem;

pub use card::{copies_for_cp, Card, CardBody, Cost, Language, DEFAULT_CARD_COLOR};
pub use deck::CardDeck;
pub use stratagem::StratagemRow;

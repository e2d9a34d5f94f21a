use rand::seq::SliceRandom;
use rand::Rng;

use crate::engine::{Randomizer, RandomizerContext};
use crate::error::{RandomizerError, Result};
use crate::model::FieldItem;
use crate::rng::RandomizerRng;
use crate::session::Session;
use crate::settings::{ItemMode, Settings};

/// Moves or replaces overworld items. Key items stay where they are.
pub struct ItemRandomizer;

impl ItemRandomizer {
    pub fn new() -> Self {
        Self
    }

    pub fn randomize<R: Rng + ?Sized>(
        items: &mut [FieldItem],
        regular_items: &[u16],
        mode: ItemMode,
        rng: &mut R,
    ) -> Result<()> {
        match mode {
            ItemMode::Unchanged => {}
            ItemMode::Shuffle => {
                let mut contents: Vec<u16> =
                    items.iter().filter(|i| !i.key_item).map(|i| i.item).collect();
                contents.shuffle(rng);
                for (slot, item) in items.iter_mut().filter(|i| !i.key_item).zip(contents) {
                    slot.item = item;
                }
            }
            ItemMode::Random => {
                for slot in items.iter_mut().filter(|i| !i.key_item) {
                    slot.item = *regular_items
                        .choose(rng)
                        .ok_or_else(|| RandomizerError::no_candidates("no regular items to place"))?;
                }
            }
        }
        Ok(())
    }
}

impl Default for ItemRandomizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Randomizer for ItemRandomizer {
    fn name(&self) -> &str {
        "items"
    }

    fn enabled(&self, settings: &Settings, session: &Session) -> bool {
        settings.items.mode != ItemMode::Unchanged && !session.field_items.is_empty()
    }

    fn run(
        &mut self,
        ctx: &RandomizerContext,
        session: &mut Session,
        rng: &mut RandomizerRng<'_>,
    ) -> Result<()> {
        Self::randomize(
            &mut session.field_items,
            &session.regular_items,
            ctx.settings.items.mode,
            rng,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn field() -> Vec<FieldItem> {
        (0..6)
            .map(|n| FieldItem {
                location: format!("Route {n}"),
                item: 100 + n,
                key_item: n == 2,
            })
            .collect()
    }

    #[test]
    fn shuffle_keeps_the_same_items_and_key_items_fixed() {
        let mut items = field();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        ItemRandomizer::randomize(&mut items, &[], ItemMode::Shuffle, &mut rng).unwrap();
        assert_eq!(items[2].item, 102);
        let mut placed: Vec<u16> = items.iter().map(|i| i.item).collect();
        placed.sort_unstable();
        assert_eq!(placed, vec![100, 101, 102, 103, 104, 105]);
    }

    #[test]
    fn random_items_come_from_the_regular_list() {
        let mut items = field();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        ItemRandomizer::randomize(&mut items, &[7, 8], ItemMode::Random, &mut rng).unwrap();
        assert_eq!(items[2].item, 102);
        assert!(items.iter().filter(|i| !i.key_item).all(|i| i.item == 7 || i.item == 8));

        let err = ItemRandomizer::randomize(&mut field(), &[], ItemMode::Random, &mut rng).unwrap_err();
        assert!(err.is_no_candidates());
    }
}

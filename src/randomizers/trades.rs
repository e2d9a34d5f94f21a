use rand::Rng;

use crate::engine::{Randomizer, RandomizerContext};
use crate::error::{RandomizerError, Result};
use crate::model::InGameTrade;
use crate::pool::SpeciesPool;
use crate::rng::RandomizerRng;
use crate::session::Session;
use crate::settings::{Settings, TradeSettings};

pub struct TradeRandomizer;

impl TradeRandomizer {
    pub fn new() -> Self {
        Self
    }

    /// Redraws the offered and/or requested species of every trade. A trade
    /// never asks for the species it gives.
    pub fn randomize<R: Rng + ?Sized>(
        trades: &mut [InGameTrade],
        pool: &SpeciesPool,
        settings: &TradeSettings,
        rng: &mut R,
    ) -> Result<()> {
        let mut pool = pool.clone();
        for trade in trades.iter_mut() {
            if settings.randomize_given {
                trade.given = pool.random_member(rng, false)?;
            }
            if settings.randomize_requested {
                let mut others = pool.clone();
                others.remove(trade.given);
                trade.requested = others.random_member(rng, false).map_err(|_| {
                    RandomizerError::no_candidates(format!("nothing to request for {}", trade.given))
                })?;
            }
        }
        Ok(())
    }
}

impl Default for TradeRandomizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Randomizer for TradeRandomizer {
    fn name(&self) -> &str {
        "trades"
    }

    fn enabled(&self, settings: &Settings, session: &Session) -> bool {
        (settings.trades.randomize_given || settings.trades.randomize_requested)
            && !session.trades.is_empty()
    }

    fn run(
        &mut self,
        ctx: &RandomizerContext,
        session: &mut Session,
        rng: &mut RandomizerRng<'_>,
    ) -> Result<()> {
        let pool = session.species_pool(false, false);
        Self::randomize(&mut session.trades, &pool, &ctx.settings.trades, rng)
    }
}

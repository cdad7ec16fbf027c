//! Per-system agent population.
//!
//! [`AgentPopulation`] draws an agent count for a system, then a template
//! for each agent, weighting templates whose affinity matches the system's
//! dominant planet economy. Capital is drawn inside the template's range and
//! price beliefs start around the market's opening prices. Every draw comes
//! from the system's `Agents` stream, so a system's population depends only
//! on the seed and its path.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use starlane_market::{SystemMarket, dominant_economy};
use starlane_types::{AgentId, PlanetEconomy, System};
use starlane_world::{AgentProfile, Purpose, RandomStream, ResourceProvider, SeededRandomStream};

use crate::agent::{Agent, Preference, PriceBelief};
use crate::config::PopulationConfig;
use crate::error::AgentError;
use crate::inventory;

/// Basis-point resolution of capital draws.
const CAPITAL_RESOLUTION: u32 = 10_000;

/// Builds the starting agents of each system.
#[derive(Debug)]
pub struct AgentPopulation<'a, R: ResourceProvider + ?Sized> {
    config: &'a PopulationConfig,
    streams: &'a SeededRandomStream,
    resources: &'a R,
}

impl<'a, R: ResourceProvider + ?Sized> AgentPopulation<'a, R> {
    /// Create a population builder. `config` is assumed validated.
    pub const fn new(
        config: &'a PopulationConfig,
        streams: &'a SeededRandomStream,
        resources: &'a R,
    ) -> Self {
        Self {
            config,
            streams,
            resources,
        }
    }

    /// Template selection weights for a system whose dominant economy is
    /// `economy`, in template order.
    pub fn template_weights(&self, economy: PlanetEconomy) -> Vec<u32> {
        self.resources
            .agent_templates()
            .iter()
            .map(|profile| {
                if profile.affinity.contains(&economy) {
                    profile.weight.saturating_mul(self.config.affinity_boost)
                } else {
                    profile.weight
                }
            })
            .collect()
    }

    /// Draw the agents of `system`, pricing beliefs from `market`.
    ///
    /// Agent sequence numbers start at 1; 0 is the house.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::NoTemplates`] if no template can be drawn,
    /// [`AgentError::UnknownShip`] if a template's ship is missing, or a
    /// stream derivation error for an out-of-range system path.
    pub fn populate(&self, system: &System, market: &SystemMarket) -> Result<Vec<Agent>, AgentError> {
        let path = [system.id.sector.into_inner(), system.id.index];
        let mut stream = self.streams.derive(&path, Purpose::Agents)?;
        let economy = dominant_economy(system);
        let weights = self.template_weights(economy);
        let count = stream.range_u32(self.config.min_agents, self.config.max_agents);

        let mut agents = Vec::new();
        for seq in 1..=count {
            let index = stream
                .weighted(&weights)
                .ok_or(AgentError::NoTemplates(system.id))?;
            let profile = self
                .resources
                .agent_templates()
                .get(index)
                .ok_or(AgentError::NoTemplates(system.id))?;
            let agent = self.instantiate(AgentId::new(system.id, seq), profile, market, &mut stream)?;
            agents.push(agent);
        }

        tracing::debug!(
            system_id = %system.id,
            ?economy,
            agents = agents.len(),
            "System populated"
        );
        Ok(agents)
    }

    fn instantiate(
        &self,
        id: AgentId,
        profile: &AgentProfile,
        market: &SystemMarket,
        stream: &mut RandomStream,
    ) -> Result<Agent, AgentError> {
        let ship = self
            .resources
            .ship_template(&profile.ship)
            .ok_or_else(|| AgentError::UnknownShip {
                template: profile.id.clone(),
                ship: profile.ship.clone(),
            })?;
        let capital = draw_capital(profile, stream);

        let mut preferences: BTreeMap<_, Preference> = BTreeMap::new();
        for commodity in &profile.produces {
            preferences.entry(*commodity).or_default().produce = profile.production_rate;
        }
        for commodity in &profile.consumes {
            preferences.entry(*commodity).or_default().consume = profile.consumption_rate;
        }

        let mut hold = BTreeMap::new();
        for (commodity, preference) in &preferences {
            let wanted = if preference.produce > 0 {
                profile.target_stock
            } else {
                profile.target_stock / 2
            };
            let quantity = wanted.min(inventory::free_capacity(&hold, ship.cargo_capacity));
            inventory::load(&mut hold, ship.cargo_capacity, *commodity, quantity)?;
        }

        let beliefs = preferences
            .keys()
            .map(|commodity| {
                (
                    *commodity,
                    PriceBelief::around(market.price(*commodity), self.config.belief_spread),
                )
            })
            .collect();

        Ok(Agent {
            id,
            template: profile.id.clone(),
            ship: ship.id.clone(),
            cargo_capacity: ship.cargo_capacity,
            capital,
            inventory: hold,
            preferences,
            beliefs,
            target_stock: profile.target_stock,
        })
    }
}

/// Uniform capital in the template's range, rounded to cents.
fn draw_capital(profile: &AgentProfile, stream: &mut RandomStream) -> Decimal {
    let step = Decimal::new(i64::from(stream.range_u32(0, CAPITAL_RESOLUTION)), 4);
    profile
        .capital_min
        .saturating_add(
            profile
                .capital_max
                .saturating_sub(profile.capital_min)
                .saturating_mul(step),
        )
        .round_dp(2)
}

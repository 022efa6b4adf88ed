//! Synthetic sales sample generation.
//!
//! Produces transactions shaped like the retail exports the adapter reads:
//! revenue is `quantity × unit price` less a campaign discount, cost is a noisy
//! share of list value. Useful for demos (`rplan run --synthetic N`) and tests.

use chrono::{Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::config::DEFAULT_NO_CAMPAIGN_LABEL;
use crate::domain::TransactionRecord;
use crate::error::{AppError, Stage};

const CAMPAIGNS: [&str; 3] = ["Black Friday", "Natal", "Dia das Mães"];
const CHANNELS: [&str; 3] = ["Loja Física", "E-commerce", "Marketplace"];
const REGIONS: [&str; 5] = ["Norte", "Nordeste", "Centro-Oeste", "Sudeste", "Sul"];

/// Share of transactions that run under some campaign.
const CAMPAIGN_PROB: f64 = 0.4;
/// Price discount applied while a campaign is active.
const CAMPAIGN_DISCOUNT: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleSpec {
    pub count: usize,
    pub seed: u64,
    pub quantity_max: u32,
    pub price_min: f64,
    pub price_max: f64,
}

impl SampleSpec {
    pub fn new(count: usize, seed: u64) -> Self {
        Self {
            count,
            seed,
            quantity_max: 30,
            price_min: 50.0,
            price_max: 3000.0,
        }
    }
}

pub fn generate_transactions(spec: &SampleSpec) -> Result<Vec<TransactionRecord>, AppError> {
    if spec.count == 0 {
        return Err(AppError::config(Stage::Load, "Sample count must be > 0."));
    }
    if spec.quantity_max == 0 {
        return Err(AppError::config(Stage::Load, "Sample quantity_max must be > 0."));
    }
    if !(spec.price_min.is_finite() && spec.price_max.is_finite() && spec.price_min > 0.0 && spec.price_max > spec.price_min)
    {
        return Err(AppError::config(
            Stage::Load,
            format!("Invalid sample price range: [{}, {}].", spec.price_min, spec.price_max),
        ));
    }

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let cost_share = Normal::<f64>::new(0.6, 0.05)
        .map_err(|e| AppError::internal(Stage::Load, format!("Noise distribution error: {e}")))?;
    let satisfaction_noise = Normal::<f64>::new(0.0, 1.0)
        .map_err(|e| AppError::internal(Stage::Load, format!("Noise distribution error: {e}")))?;

    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .ok_or_else(|| AppError::internal(Stage::Load, "Invalid sample start date."))?;

    let mut out = Vec::with_capacity(spec.count);
    for _ in 0..spec.count {
        let quantity = rng.gen_range(1..=spec.quantity_max);
        let unit_price = (rng.gen_range(spec.price_min..=spec.price_max) * 100.0).round() / 100.0;
        let has_campaign = rng.gen_bool(CAMPAIGN_PROB);
        let campaign = if has_campaign {
            CAMPAIGNS[rng.gen_range(0..CAMPAIGNS.len())]
        } else {
            DEFAULT_NO_CAMPAIGN_LABEL
        };

        let list_value = f64::from(quantity) * unit_price;
        let discount = if has_campaign { CAMPAIGN_DISCOUNT } else { 0.0 };
        let total_value = list_value * (1.0 - discount);
        let total_cost = list_value * cost_share.sample(&mut rng).clamp(0.3, 0.9);

        let satisfaction = (7.5 + satisfaction_noise.sample(&mut rng)).clamp(1.0, 10.0);
        let sale_date = start + Duration::days(rng.gen_range(0..365));

        out.push(TransactionRecord {
            sale_date: Some(sale_date),
            quantity,
            unit_price,
            total_value,
            total_cost: Some(total_cost),
            campaign: campaign.to_string(),
            has_campaign,
            satisfaction: Some(satisfaction),
            channel: Some(CHANNELS[rng.gen_range(0..CHANNELS.len())].to_string()),
            region: Some(REGIONS[rng.gen_range(0..REGIONS.len())].to_string()),
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sample() {
        let a = generate_transactions(&SampleSpec::new(50, 42)).unwrap();
        let b = generate_transactions(&SampleSpec::new(50, 42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn records_respect_ranges() {
        let spec = SampleSpec::new(200, 1);
        for r in generate_transactions(&spec).unwrap() {
            assert!((1..=spec.quantity_max).contains(&r.quantity));
            assert!(r.unit_price >= spec.price_min && r.unit_price <= spec.price_max + 0.01);
            assert!(r.total_value > 0.0);
            assert_eq!(r.has_campaign, r.campaign != DEFAULT_NO_CAMPAIGN_LABEL);
        }
    }

    #[test]
    fn zero_count_is_rejected() {
        assert!(generate_transactions(&SampleSpec::new(0, 1)).is_err());
    }
}

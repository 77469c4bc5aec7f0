use gacha_core::{Card, DrawEngine, DrawRng};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::collections::HashMap;

const SAMPLE_SIZE: usize = 1000;

fn standard_catalog() -> Vec<Card> {
    vec![
        Card::new("common-1", "Slime", 70.0, "common"),
        Card::new("rare-1", "Knight", 25.0, "rare"),
        Card::new("sr-1", "Wizard", 4.0, "super_rare"),
        Card::new("ur-1", "Dragon", 1.0, "ultra_rare"),
    ]
}

fn tally<'a>(cards: impl IntoIterator<Item = &'a Card>) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for card in cards {
        *counts.entry(card.id.clone()).or_insert(0) += 1;
    }
    counts
}

#[test]
fn heavy_item_dominates_thousand_draws() {
    let engine = DrawEngine::new(standard_catalog()).unwrap();
    for seed in [1_u64, 42, 1337, 0xDEAD_BEEF] {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let draws = engine.draw_multiple(SAMPLE_SIZE, &mut rng).unwrap();
        assert_eq!(draws.len(), SAMPLE_SIZE);
        let counts = tally(draws);
        let heavy = counts.get("common-1").copied().unwrap_or(0);
        assert!(
            (600..=800).contains(&heavy),
            "seed {seed}: 70-weight item drawn {heavy} times"
        );
    }
}

#[test]
fn fractional_weights_stay_in_catalog() {
    let cards = vec![
        Card::new("a", "A", 0.1, "common"),
        Card::new("b", "B", 0.2, "common"),
        Card::new("c", "C", 0.3, "rare"),
        Card::new("d", "D", 0.7, "ultra_rare"),
    ];
    let engine = DrawEngine::new(cards).unwrap();
    let mut rng = DrawRng::from_user_seed(2024);
    let ids: Vec<&str> = engine.items().iter().map(|c| c.id.as_str()).collect();
    for card in engine.draw_multiple(5_000, &mut rng).unwrap() {
        assert!(ids.contains(&card.id.as_str()));
    }
}

#[test]
fn probabilities_match_weight_share() {
    let catalogs = [
        standard_catalog(),
        vec![
            Card::new("x", "X", 1.0, "common"),
            Card::new("y", "Y", 1.0, "common"),
            Card::new("z", "Z", 1.0, "common"),
        ],
        vec![
            Card::new("p", "P", 3.0, "common"),
            Card::new("q", "Q", 7.0, "rare"),
            Card::new("r", "R", 11.0, "rare"),
            Card::new("s", "S", 13.0, "super_rare"),
            Card::new("t", "T", 17.0, "ultra_rare"),
        ],
    ];
    for catalog in catalogs {
        let engine = DrawEngine::new(catalog).unwrap();
        let probs = engine.probabilities();
        assert_eq!(probs.len(), engine.len());
        for card in engine.items() {
            let expected = (card.weight / engine.total_weight() * 100.0 * 100.0).round() / 100.0;
            assert!((probs[&card.id] - expected).abs() < 1e-9);
        }
        let total: f64 = probs.values().sum();
        assert!((total - 100.0).abs() <= 0.1, "probabilities sum to {total}");
    }
}

#[test]
fn observed_rates_track_probabilities() {
    let engine = DrawEngine::new(standard_catalog()).unwrap();
    let probs = engine.probabilities();
    let mut rng = ChaCha20Rng::seed_from_u64(7);
    let samples = 20_000;
    let counts = tally(engine.draw_multiple(samples, &mut rng).unwrap());
    for (id, percent) in probs {
        let observed = counts.get(&id).copied().unwrap_or(0) as f64 / samples as f64 * 100.0;
        assert!(
            (observed - percent).abs() < 2.0,
            "{id}: observed {observed:.2}% vs expected {percent:.2}%"
        );
    }
}

//! Transfer-market data to fantasy prices and positions

use squadup_core::{Position, Price};

/// Price given to players whose market value is missing or unreadable
pub const MINIMUM_PRICE: Price = Price::from_tenths(40);

/// (market value floor in €m, fantasy price in tenths of £m), highest first
const PRICE_TIERS: [(f64, i32); 12] = [
    (150.0, 145),
    (120.0, 140),
    (100.0, 120),
    (80.0, 105),
    (60.0, 90),
    (50.0, 85),
    (40.0, 75),
    (30.0, 65),
    (25.0, 60),
    (20.0, 55),
    (15.0, 50),
    (10.0, 45),
];

/// Convert a transfer-market valuation such as `€65.00m` or `€600k`
///
/// Anything that does not parse as a `k` or `m` amount gets [`MINIMUM_PRICE`].
pub fn market_value_to_price(market_value: &str) -> Price {
    match parse_millions(market_value) {
        Some(millions) => PRICE_TIERS
            .iter()
            .find(|(floor, _)| millions >= *floor)
            .map(|&(_, tenths)| Price::from_tenths(tenths))
            .unwrap_or(MINIMUM_PRICE),
        None => MINIMUM_PRICE,
    }
}

fn parse_millions(market_value: &str) -> Option<f64> {
    let value = market_value.trim().trim_start_matches('€').trim();

    let (amount, scale) = if let Some(amount) = value.strip_suffix('k') {
        (amount, 1000.0)
    } else if let Some(amount) = value.strip_suffix('m') {
        (amount, 1.0)
    } else {
        return None;
    };

    amount
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(|n| n / scale)
}

/// Map a descriptive transfer-market position (`Centre-Back`, `Left Winger`)
/// onto the four fantasy positions; unrecognised roles count as midfield
pub fn map_position(raw: &str) -> Position {
    if raw.contains("Goalkeeper") {
        Position::Goalkeeper
    } else if raw.contains("Back") || raw.contains("Defender") {
        Position::Defender
    } else if raw.contains("Midfield") || raw.contains("Winger") {
        Position::Midfielder
    } else if raw.contains("Forward") || raw.contains("Striker") {
        Position::Forward
    } else {
        Position::Midfielder
    }
}

/// Map the short position codes used by football data APIs
pub fn map_api_position(code: &str) -> Option<Position> {
    match code.trim().to_ascii_uppercase().as_str() {
        "G" | "GK" => Some(Position::Goalkeeper),
        "D" | "DF" | "DEF" => Some(Position::Defender),
        "M" | "MF" | "MID" => Some(Position::Midfielder),
        "F" | "FW" | "FWD" => Some(Position::Forward),
        _ => None,
    }
}

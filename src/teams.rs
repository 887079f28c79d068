//! Franchise reference data.
//!
//! Normalizes legacy team codes and odds-feed franchise names to the
//! modern three-letter codes, and carries home stadium coordinates for
//! weather lookups and travel distance.

// ---------------------------------------------------------------------------
// Franchise table
// ---------------------------------------------------------------------------

/// A franchise and its home venue.
#[derive(Debug)]
pub struct Franchise {
    pub code: &'static str,
    /// Full names used by sportsbooks, current name first.
    pub names: &'static [&'static str],
    pub stadium: &'static str,
    pub lat: f64,
    pub lon: f64,
}

const FRANCHISES: &[Franchise] = &[
    Franchise { code: "ARI", names: &["Arizona Cardinals"], stadium: "State Farm Stadium", lat: 33.5276, lon: -112.2626 },
    Franchise { code: "ATL", names: &["Atlanta Falcons"], stadium: "Mercedes-Benz Stadium", lat: 33.7554, lon: -84.4008 },
    Franchise { code: "BAL", names: &["Baltimore Ravens"], stadium: "M&T Bank Stadium", lat: 39.2780, lon: -76.6227 },
    Franchise { code: "BUF", names: &["Buffalo Bills"], stadium: "Highmark Stadium", lat: 42.7738, lon: -78.7870 },
    Franchise { code: "CAR", names: &["Carolina Panthers"], stadium: "Bank of America Stadium", lat: 35.2258, lon: -80.8528 },
    Franchise { code: "CHI", names: &["Chicago Bears"], stadium: "Soldier Field", lat: 41.8623, lon: -87.6167 },
    Franchise { code: "CIN", names: &["Cincinnati Bengals"], stadium: "Paycor Stadium", lat: 39.0955, lon: -84.5161 },
    Franchise { code: "CLE", names: &["Cleveland Browns"], stadium: "Cleveland Browns Stadium", lat: 41.5061, lon: -81.6995 },
    Franchise { code: "DAL", names: &["Dallas Cowboys"], stadium: "AT&T Stadium", lat: 32.7473, lon: -97.0945 },
    Franchise { code: "DEN", names: &["Denver Broncos"], stadium: "Empower Field at Mile High", lat: 39.7439, lon: -105.0201 },
    Franchise { code: "DET", names: &["Detroit Lions"], stadium: "Ford Field", lat: 42.3400, lon: -83.0456 },
    Franchise { code: "GB", names: &["Green Bay Packers"], stadium: "Lambeau Field", lat: 44.5013, lon: -88.0622 },
    Franchise { code: "HOU", names: &["Houston Texans"], stadium: "NRG Stadium", lat: 29.6847, lon: -95.4107 },
    Franchise { code: "IND", names: &["Indianapolis Colts"], stadium: "Lucas Oil Stadium", lat: 39.7601, lon: -86.1639 },
    Franchise { code: "JAX", names: &["Jacksonville Jaguars"], stadium: "EverBank Stadium", lat: 30.3239, lon: -81.6373 },
    Franchise { code: "KC", names: &["Kansas City Chiefs"], stadium: "GEHA Field at Arrowhead Stadium", lat: 39.0489, lon: -94.4839 },
    Franchise { code: "LV", names: &["Las Vegas Raiders", "Oakland Raiders"], stadium: "Allegiant Stadium", lat: 36.0909, lon: -115.1833 },
    Franchise { code: "LAC", names: &["Los Angeles Chargers", "San Diego Chargers"], stadium: "SoFi Stadium", lat: 33.9535, lon: -118.3392 },
    Franchise { code: "LAR", names: &["Los Angeles Rams", "St. Louis Rams", "St Louis Rams"], stadium: "SoFi Stadium", lat: 33.9535, lon: -118.3392 },
    Franchise { code: "MIA", names: &["Miami Dolphins"], stadium: "Hard Rock Stadium", lat: 25.9580, lon: -80.2389 },
    Franchise { code: "MIN", names: &["Minnesota Vikings"], stadium: "U.S. Bank Stadium", lat: 44.9737, lon: -93.2577 },
    Franchise { code: "NE", names: &["New England Patriots"], stadium: "Gillette Stadium", lat: 42.0909, lon: -71.2643 },
    Franchise { code: "NO", names: &["New Orleans Saints"], stadium: "Caesars Superdome", lat: 29.9511, lon: -90.0812 },
    Franchise { code: "NYG", names: &["New York Giants"], stadium: "MetLife Stadium", lat: 40.8135, lon: -74.0745 },
    Franchise { code: "NYJ", names: &["New York Jets"], stadium: "MetLife Stadium", lat: 40.8135, lon: -74.0745 },
    Franchise { code: "PHI", names: &["Philadelphia Eagles"], stadium: "Lincoln Financial Field", lat: 39.9008, lon: -75.1675 },
    Franchise { code: "PIT", names: &["Pittsburgh Steelers"], stadium: "Acrisure Stadium", lat: 40.4468, lon: -80.0158 },
    Franchise { code: "SEA", names: &["Seattle Seahawks"], stadium: "Lumen Field", lat: 47.5952, lon: -122.3316 },
    Franchise { code: "SF", names: &["San Francisco 49ers"], stadium: "Levi's Stadium", lat: 37.4030, lon: -121.9700 },
    Franchise { code: "TB", names: &["Tampa Bay Buccaneers"], stadium: "Raymond James Stadium", lat: 27.9759, lon: -82.5033 },
    Franchise { code: "TEN", names: &["Tennessee Titans"], stadium: "Nissan Stadium", lat: 36.1665, lon: -86.7713 },
    Franchise {
        code: "WAS",
        names: &["Washington Commanders", "Washington Football Team", "Washington Redskins"],
        stadium: "Northwest Stadium",
        lat: 38.9077,
        lon: -76.8645,
    },
];

/// Legacy schedule codes and their modern replacements.
const CODE_FIXES: &[(&str, &str)] = &[("LA", "LAR"), ("STL", "LAR"), ("SD", "LAC"), ("OAK", "LV")];

const EARTH_RADIUS_MILES: f64 = 3958.8;

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

/// Normalize a schedule team code: trims, upper-cases, and maps
/// relocated franchises to their current code.
pub fn normalize_code(code: &str) -> String {
    let c = code.trim().to_uppercase();
    CODE_FIXES
        .iter()
        .find(|(old, _)| *old == c)
        .map(|(_, new)| new.to_string())
        .unwrap_or(c)
}

/// Resolve a sportsbook team label to a code. Accepts full franchise
/// names (case-insensitive) as well as bare codes.
pub fn code_for_name(name: &str) -> Option<&'static str> {
    let n = name.trim();
    if let Some(f) = FRANCHISES
        .iter()
        .find(|f| f.names.iter().any(|full| full.eq_ignore_ascii_case(n)))
    {
        return Some(f.code);
    }
    let code = normalize_code(n);
    FRANCHISES.iter().find(|f| f.code == code).map(|f| f.code)
}

/// Look up a franchise by (normalized) code.
pub fn franchise(code: &str) -> Option<&'static Franchise> {
    let code = normalize_code(code);
    FRANCHISES.iter().find(|f| f.code == code)
}

/// Great-circle distance in statute miles.
pub fn haversine_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * a.sqrt().asin()
}

/// Distance the away team travels from its home stadium to the host's.
pub fn travel_miles(home: &str, away: &str) -> Option<f64> {
    let h = franchise(home)?;
    let a = franchise(away)?;
    Some(haversine_miles(a.lat, a.lon, h.lat, h.lon))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Marker colours by hazard label.
//!
//! Labels are matched exactly as the registry spells them in the Journal
//! Officiel (`libelle_risque_jo`). Colour names are valid CSS colours.

/// Colour of the queried-address marker.
pub const QUERY_POINT_COLOR: &str = "blue";

/// Colour for labels missing from [`RISK_COLORS`].
pub const FALLBACK_COLOR: &str = "gray";

/// Known hazard labels and their marker colours.
pub const RISK_COLORS: &[(&str, &str)] = &[
    ("Inondations et/ou Coulées de Boue", "darkred"),
    ("Mouvements de terrain", "orange"),
    ("Séisme", "green"),
    ("Feux de forêt", "purple"),
];

/// Returns the marker colour for a hazard label.
#[must_use]
pub fn marker_color(label: &str) -> &'static str {
    RISK_COLORS
        .iter()
        .find(|(known, _)| *known == label)
        .map_or(FALLBACK_COLOR, |&(_, color)| color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_labels() {
        assert_eq!(marker_color("Séisme"), "green");
        assert_eq!(marker_color("Inondations et/ou Coulées de Boue"), "darkred");
        assert_eq!(marker_color("Mouvements de terrain"), "orange");
        assert_eq!(marker_color("Feux de forêt"), "purple");
    }

    #[test]
    fn unknown_labels_fall_back() {
        assert_eq!(marker_color("Tempête"), "gray");
        assert_eq!(marker_color(""), "gray");
        assert_eq!(marker_color("séisme"), "gray");
    }
}

use eframe::egui::{Context, Visuals};

/// Formats a price with "Trader Precision".
/// - Large (>1000): 2 decimals ($95,123.50)
/// - Medium (1-1000): 4 decimals ($12.4829)
/// - Small (<1): 6-8 decimals ($0.00000231)
pub fn format_price(price: f64) -> String {
    if price == 0.0 {
        return "$0.00".to_string();
    }

    let abs_price = price.abs();

    if abs_price >= 1000.0 {
        // BTC: 2 decimals is standard for high value
        format!("${:.2}", price)
    } else if abs_price >= 1.0 {
        // Normal alts: 4 decimals captures the cents + fractions
        format!("${:.4}", price)
    } else if abs_price >= 0.01 {
        // Pennies: 5 decimals
        format!("${:.5}", price)
    } else {
        // Sub-penny / meme coins: 8 decimals needed to see movement
        format!("${:.8}", price)
    }
}

/// Sets up custom visuals for the entire application
pub fn setup_custom_visuals(ctx: &Context) {
    let mut visuals = Visuals::dark();
    visuals.window_fill = eframe::egui::Color32::from_gray(18);
    visuals.panel_fill = eframe::egui::Color32::from_gray(24);
    ctx.set_visuals(visuals);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precision_tracks_magnitude() {
        assert_eq!(format_price(0.0), "$0.00");
        assert_eq!(format_price(95_123.5), "$95123.50");
        assert_eq!(format_price(12.4829), "$12.4829");
        assert_eq!(format_price(0.023), "$0.02300");
        assert_eq!(format_price(0.00000231), "$0.00000231");
    }
}

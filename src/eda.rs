//! Static exploratory-analysis charts shown on the "EDA" screen.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct EdaSection {
    pub title: &'static str,
    pub file: &'static str,
    /// Rendering hint; the asset itself is served at its stored size.
    pub display_width: u32,
    pub display_height: u32,
    pub caption: &'static str,
}

pub const EDA_SECTIONS: [EdaSection; 4] = [
    EdaSection {
        title: "Delivery Time Distibution over Data",
        file: "delivery_time.png",
        display_width: 800,
        display_height: 400,
        caption: "According to the histogram plot, delivery agents often take between 60 and 160 minutes for deliveries.",
    },
    EdaSection {
        title: "Average Delivery Time by Traffic Condition",
        file: "traffic.png",
        display_width: 800,
        display_height: 400,
        caption: "As expected, delivery agents take more time when traffic conditions are jammed. Additionally, medium and high traffic conditions show similar delivery times",
    },
    EdaSection {
        title: "Delivery Time Trend Over the Day",
        file: "hour.png",
        display_width: 800,
        display_height: 400,
        caption: "According to the line plot, from the start of the day until 10 AM, delivery agents take between 50 to 105 minutes. However, after 10 AM, there is a drastic increase, peaking at around 125 minutes by 11 AM. The delivery time then increases linearly until 2 PM. Afterward, it follows a zigzag pattern for the rest of the day. Finally, between 7 to 9 PM, delivery agents take approximately 150 minutes for deliveries",
    },
    EdaSection {
        title: "Number of Deliveries per Category",
        file: "category.png",
        display_width: 800,
        display_height: 500,
        caption: "According to the count plot, customer orders are highest for Electronics, Apparel, and Books.",
    },
];

/// Look up a chart by file name. Only the four known assets are ever served.
pub fn find(file: &str) -> Option<&'static EdaSection> {
    EDA_SECTIONS.iter().find(|s| s.file == file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_known_files_resolve() {
        assert_eq!(find("traffic.png").map(|s| s.display_height), Some(400));
        assert_eq!(find("category.png").map(|s| s.display_height), Some(500));
        assert!(find("../random_forest_model.json").is_none());
        assert!(find("secrets.png").is_none());
    }
}

//! Peer colors and display labels

use contour_network::PeerId;

/// Colors a local peer picks from at session start
pub const COLORS: [&str; 10] = [
    "#FF5733", "#33FF57", "#3357FF", "#FF33A1", "#33FFF5", "#F5FF33", "#FF8C33", "#8C33FF",
    "#33FF8C", "#FF3333",
];

/// Label of the local peer's own entry
pub const LOCAL_LABEL: &str = "You";

/// Random palette color
pub fn random_color() -> &'static str {
    COLORS[rand::random_range(0..COLORS.len())]
}

/// Remote label: first four characters of the peer id
pub fn remote_label(peer: &PeerId) -> String {
    peer.short().to_string()
}

/// UI caption for the number of active cursors
pub fn active_cursor_label(count: usize) -> String {
    if count == 1 {
        "1 ACTIVE CURSOR".to_string()
    } else {
        format!("{count} ACTIVE CURSORS")
    }
}

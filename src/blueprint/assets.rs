use serde::Serialize;

/// How a building is drawn on the island and in the shop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Asset {
    pub emoji: &'static str,
    pub color: &'static str,
    pub scale: f32,
}

pub const DEFAULT_ASSET: Asset = Asset {
    emoji: "📦",
    color: "from-gray-400 to-gray-600",
    scale: 1.0,
};

const fn asset(emoji: &'static str, color: &'static str, scale: f32) -> Asset {
    Asset {
        emoji,
        color,
        scale,
    }
}

/// Looks up the appearance for a blueprint name. Unknown names fall back to
/// a plain crate.
pub fn asset_for(name: &str) -> Asset {
    match name {
        // survival
        "Campfire" => asset("🔥", "from-orange-400 to-red-600", 0.75),
        "Log Cabin" => asset("🛖", "from-yellow-600 to-amber-800", 0.9),
        "Vending Machine" => asset("🥤", "from-blue-400 to-red-500", 0.75),
        // village
        "Burger Shop" => asset("🍔", "from-orange-300 to-yellow-500", 0.9),
        "Wind Turbine" => asset("🌬️", "from-cyan-300 to-blue-500", 1.25),
        "Library" => asset("🏛️", "from-slate-300 to-slate-500", 1.1),
        "School" => asset("🏫", "from-yellow-200 to-orange-300", 1.1),
        // city
        "Broadcast Tower" => asset("🗼", "from-red-500 to-orange-600", 1.5),
        "Cinema" => asset("🍿", "from-purple-500 to-pink-500", 1.0),
        "International Airport" => asset("✈️", "from-blue-200 to-sky-500", 1.25),
        "Skyscraper" => asset("🏙️", "from-indigo-300 to-purple-500", 1.5),
        // future
        "Space Rocket" => asset("🚀", "from-gray-200 to-orange-500", 1.5),
        "Satellite" => asset("🛰️", "from-blue-900 to-purple-900", 0.75),
        "Statue of Liberty" => asset("🗽", "from-emerald-300 to-teal-600", 1.5),
        "Alien Portal" => asset("🌀", "from-fuchsia-500 to-purple-600", 1.5),
        _ => DEFAULT_ASSET,
    }
}

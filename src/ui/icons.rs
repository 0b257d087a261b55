pub struct Icons;

impl Icons {
    pub const ROCKET: &str = "🚀";
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const STATS: &str = "📊";
    pub const FILE: &str = "📄";
    pub const DATABASE: &str = "🗄️";
    pub const PERSON: &str = "👤";
    pub const BUILDING: &str = "🏢";
    pub const ROBOT: &str = "🤖";
    pub const BRAIN: &str = "🧠";
    pub const DEL: &str = "🗑️";
    pub const GLOBE: &str = "🌍";
}

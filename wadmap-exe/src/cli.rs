use argh::FromArgs;
use log::LevelFilter;

/// Load the levels of a WAD and query their BSP trees
#[derive(Debug, Clone, FromArgs)]
pub struct CLIOptions {
    /// verbose level: off, error, warn, info, debug
    #[argh(option)]
    pub verbose: Option<LevelFilter>,
    /// path to the base WAD
    #[argh(option, default = "Default::default()")]
    pub iwad: String,
    /// path to patch WAD, loaded in order after the base
    #[argh(option)]
    pub pwad: Vec<String>,
    /// don't look for a `.gwa` with the GL nodes next to each WAD
    #[argh(switch)]
    pub no_gwa: bool,
    /// level to query, for example E1M1 or MAP01
    #[argh(option)]
    pub level: Option<String>,
    /// x coordinate of the point to locate
    #[argh(option, default = "0.0")]
    pub x: f32,
    /// y coordinate of the point to locate
    #[argh(option, default = "0.0")]
    pub y: f32,
    /// count the leaves of each tree in the queried level
    #[argh(switch)]
    pub leaves: bool,
}

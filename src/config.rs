/// Movement tuning loader.
///
/// Reads `tuning.toml` from the executable's directory (or CWD).
/// Falls back to the built-in feel if the file is missing or incomplete.
/// All per-tick quantities are calibrated for the 60 Hz reference rate.

use serde::Deserialize;
use std::path::PathBuf;

// ── Tuning Tree ──

#[derive(Clone, Debug, Deserialize, Default)]
#[serde(default)]
pub struct Tuning {
    pub movement: MovementTuning,
    pub jump: JumpTuning,
    pub dash: DashTuning,
    pub climb: ClimbTuning,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MovementTuning {
    /// Top ground speed, tiles per reference tick pre time-scale.
    pub walk_max: f32,
    pub walk_accel: f32,
    pub friction_grounded: f32,
    pub friction_air: f32,
    pub gravity_accel: f32,
    pub gravity_max: f32,
    /// Velocity units to tiles-per-tick conversion applied at integration.
    pub time_scale: f32,
    /// Smallest movement step the resolver will take.
    pub move_epsilon: f32,
    pub player_width: f32,
    pub player_height: f32,
    /// Freshness window for buffered presses, reference ticks.
    pub input_buffer_ticks: u64,
    /// Ticks an axis may be fully blocked before its velocity is dropped.
    pub slide_grace_ticks: u64,
    /// How far around a corner the resolver will nudge the player.
    pub corner_nudge: f32,
    pub corner_nudge_fast: f32,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct JumpTuning {
    pub liftoff: f32,
    /// Horizontal speed multiplier on ground jumps and reversals.
    pub ultra_boost: f32,
    pub coyote_ticks: u64,
    /// Window of zeroed gravity after a jump while the button stays held.
    pub zero_grav_ticks: u64,
    pub wall_jump_speed: f32,
    /// Probe distance when testing for a wall beside the player.
    pub wall_sense: f32,
    /// Extra height on a neutral (no horizontal input) wall jump.
    pub neutral_scale: f32,
    /// Height multiplier for jumping out of an upward dash at a wall.
    pub bounce_scale: f32,
    /// Ticks of suppressed horizontal control after a wall jump.
    pub no_control_ticks: u64,
    /// Horizontal speed granted by a downward-dash jump.
    pub super_speed: f32,
    /// Horizontal speed granted by a diagonal-down-dash jump.
    pub hyper_speed: f32,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DashTuning {
    pub speed: f32,
    /// Speed reduction applied to upward dashes.
    pub up_scale: f32,
    pub duration_ticks: u64,
    /// Residual speed in the dash direction once the dash expires.
    pub end_speed: f32,
    pub cooldown_ticks: u64,
    /// Delay before a ground contact restores the dash charge.
    pub refresh_ticks: u64,
    /// Frames the whole simulation freezes while a dash aims.
    pub freeze_ticks: u64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ClimbTuning {
    pub speed: f32,
    /// Vertical decay factor while clinging without direction input.
    pub slip: f32,
}

// ── Defaults ──

impl Default for MovementTuning {
    fn default() -> Self {
        MovementTuning {
            walk_max: 10.0,
            walk_accel: 1.0,
            friction_grounded: 1.0,
            friction_air: 0.3,
            gravity_accel: 1.0,
            gravity_max: 30.0,
            time_scale: 0.01,
            move_epsilon: 0.005,
            player_width: 0.7,
            player_height: 1.0,
            input_buffer_ticks: 10,
            slide_grace_ticks: 3,
            corner_nudge: 0.2,
            corner_nudge_fast: 0.4,
        }
    }
}

impl Default for JumpTuning {
    fn default() -> Self {
        JumpTuning {
            liftoff: 13.0,
            ultra_boost: 1.2,
            coyote_ticks: 10,
            zero_grav_ticks: 10,
            wall_jump_speed: 11.0,
            wall_sense: 0.1,
            neutral_scale: 1.12,
            bounce_scale: 1.5,
            no_control_ticks: 8,
            super_speed: 17.0,
            hyper_speed: 22.0,
        }
    }
}

impl Default for DashTuning {
    fn default() -> Self {
        DashTuning {
            speed: 25.0,
            up_scale: 0.75,
            duration_ticks: 12,
            end_speed: 15.0,
            cooldown_ticks: 12,
            refresh_ticks: 6,
            freeze_ticks: 4,
        }
    }
}

impl Default for ClimbTuning {
    fn default() -> Self {
        ClimbTuning {
            speed: 6.0,
            slip: 0.5,
        }
    }
}

// ── Loading ──

impl Tuning {
    /// Load tuning from `tuning.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) XDG data home, (4) /usr/share/ascent.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        load_toml(&candidate_dirs())
    }
}

/// Candidate directories to search: exe dir + CWD + system paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so a packaged binary still finds data relative
        // to its real location.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/ascent)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/ascent");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory (/usr/share/ascent)
    let sys = PathBuf::from("/usr/share/ascent");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    // 5. Fallback
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for tuning.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> Tuning {
    for dir in search_dirs {
        let path = dir.join("tuning.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<Tuning>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: tuning.toml parse error: {e}");
                        eprintln!("Using default tuning.");
                        return Tuning::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    Tuning::default()
}

//! Keyboard configuration.
//!
//! Each builder takes its own section by reference. Sections are plain
//! structs with `#[serde(default)]`, so a TOML file only needs the values it
//! changes:
//!
//! ```toml
//! [socket]
//! plate_thickness = 3.0
//!
//! [skirt]
//! flare_angle = 30.0
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors from loading or validating a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The TOML was malformed or had wrongly typed values.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    /// The configuration could not be written as TOML.
    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// A value is out of range.
    #[error("invalid value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: String,
        /// What is wrong with it.
        reason: String,
    },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.into(),
    }
}

fn require_positive(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be positive, got {}", value)))
    }
}

/// Switch socket plate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocketConfig {
    /// Plate width along X in mm, reserving space around the switch.
    pub overall_width: f64,
    /// Plate length along Y in mm.
    pub overall_length: f64,
    /// Switch opening along X; controls how tight the switch fits.
    pub switch_opening_width: f64,
    /// Switch opening along Y.
    pub switch_opening_length: f64,
    /// Plate thickness where the switch clips in.
    pub plate_thickness: f64,
    /// Hot-swap PCB sockets. Not supported.
    pub hot_swap: bool,
    /// Tapered nubs on the side walls that stabilize the switch.
    pub side_nubs: bool,
    /// Length of each side nub along Y.
    pub side_nub_width: f64,
    /// Radius of the rounded nub edge.
    pub side_nub_radius: f64,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            overall_width: 18.0,
            overall_length: 18.0,
            switch_opening_width: 14.4,
            switch_opening_length: 14.4,
            plate_thickness: 4.0,
            hot_swap: false,
            side_nubs: true,
            side_nub_width: 2.75,
            side_nub_radius: 1.0,
        }
    }
}

impl SocketConfig {
    /// Check the section's ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("socket.overall_width", self.overall_width)?;
        require_positive("socket.overall_length", self.overall_length)?;
        require_positive("socket.switch_opening_width", self.switch_opening_width)?;
        require_positive("socket.switch_opening_length", self.switch_opening_length)?;
        require_positive("socket.plate_thickness", self.plate_thickness)?;
        require_positive("socket.side_nub_width", self.side_nub_width)?;
        require_positive("socket.side_nub_radius", self.side_nub_radius)?;
        if self.switch_opening_width >= self.overall_width {
            return Err(invalid(
                "socket.switch_opening_width",
                "must be smaller than overall_width",
            ));
        }
        if self.switch_opening_length >= self.overall_length {
            return Err(invalid(
                "socket.switch_opening_length",
                "must be smaller than overall_length",
            ));
        }
        Ok(())
    }
}

/// Keycap outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeycapConfig {
    /// Width of the bottom rectangle for a 1u cap.
    pub bottom_width: f64,
    /// Length of the bottom rectangle.
    pub bottom_length: f64,
    /// Width of the top face for a 1u cap.
    pub top_width: f64,
    /// Length of the top face.
    pub top_length: f64,
    /// Height of the front edge of the top face above the cap bottom.
    pub top_front_height: f64,
    /// Height of the back edge of the top face above the cap bottom.
    pub top_back_height: f64,
    /// Lean of the front face from vertical, in degrees.
    pub front_lean_angle: f64,
    /// Depth of the cylindrical dish in the top face. Zero disables it.
    pub dish_depth: f64,
    /// Height of the cap bottom above the plate when mounted.
    pub mounting_offset: f64,
    /// Distance between neighbouring keys; widens multi-unit caps.
    pub key_pitch: f64,
}

impl Default for KeycapConfig {
    fn default() -> Self {
        Self {
            bottom_width: 18.0,
            bottom_length: 18.0,
            top_width: 12.5,
            top_length: 14.5,
            top_front_height: 9.1,
            top_back_height: 9.35,
            front_lean_angle: (0.5f64 / 11.5).atan().to_degrees(),
            dish_depth: 0.85,
            mounting_offset: 5.5,
            key_pitch: 19.0,
        }
    }
}

impl KeycapConfig {
    /// Check the section's ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("keycap.bottom_width", self.bottom_width)?;
        require_positive("keycap.bottom_length", self.bottom_length)?;
        require_positive("keycap.top_width", self.top_width)?;
        require_positive("keycap.top_length", self.top_length)?;
        require_positive("keycap.top_front_height", self.top_front_height)?;
        require_positive("keycap.top_back_height", self.top_back_height)?;
        require_positive("keycap.key_pitch", self.key_pitch)?;
        if self.dish_depth < 0.0 || self.dish_depth * 2.0 >= self.top_width {
            return Err(invalid("keycap.dish_depth", "must be in [0, top_width / 2)"));
        }
        if (self.top_front_height - self.top_back_height).abs() >= self.top_length {
            return Err(invalid(
                "keycap.top_back_height",
                "front/back height difference must be less than top_length",
            ));
        }
        if !(0.0..90.0).contains(&self.front_lean_angle) {
            return Err(invalid("keycap.front_lean_angle", "must be in [0, 90)"));
        }
        Ok(())
    }
}

/// Supported switch families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchType {
    /// Cherry MX and compatible switches.
    CherryMx,
}

/// Which part of a key its anchors describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAlignment {
    /// Top face of the keycap, so caps form a smooth surface.
    Face,
    /// Top of the socket plate, for plate-mounted boards.
    Socket,
}

/// Key assembly options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    /// Switch family, selects the socket builder.
    pub switch_type: SwitchType,
    /// Anchor alignment of the assembled key.
    pub alignment: KeyAlignment,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            switch_type: SwitchType::CherryMx,
            alignment: KeyAlignment::Face,
        }
    }
}

/// Curved ortholinear column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    /// Number of keys in the column.
    pub num_keys: usize,
    /// Radius of the column curve, measured to the key anchors.
    pub radius: f64,
    /// Gap between neighbouring keys at the anchor surface.
    pub key_gap: f64,
    /// Index of the key that sits flat before the home tilt.
    pub home_index: usize,
    /// Tilt of every key about Y, in degrees.
    pub key_side_lean: f64,
    /// Tilt of the whole column about X after layout, in degrees.
    pub home_tiltback_angle: f64,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            num_keys: 4,
            radius: 56.4,
            key_gap: 2.0,
            home_index: 1,
            key_side_lean: 0.0,
            home_tiltback_angle: 0.0,
        }
    }
}

impl ColumnConfig {
    /// Check the section's ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_keys == 0 {
            return Err(invalid("column.num_keys", "must be at least 1"));
        }
        if self.home_index >= self.num_keys {
            return Err(invalid("column.home_index", "must be less than num_keys"));
        }
        require_positive("column.radius", self.radius)?;
        if !(self.key_gap.is_finite() && self.key_gap >= 0.0) {
            return Err(invalid("column.key_gap", "must not be negative"));
        }
        Ok(())
    }
}

/// Flared skirt wall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkirtConfig {
    /// Wall thickness in mm.
    pub wall_thickness: f64,
    /// Length of the flared section along the flare direction.
    pub flare_length: f64,
    /// Angle of the flare measured from the outer edge toward the top edge,
    /// in degrees. 90 flares straight out, 45 splits the two evenly.
    pub flare_angle: f64,
}

impl Default for SkirtConfig {
    fn default() -> Self {
        Self {
            wall_thickness: 2.0,
            flare_length: 7.0,
            flare_angle: 45.0,
        }
    }
}

impl SkirtConfig {
    /// Check ranges: positive thickness and length, angle in (0, 90].
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("skirt.wall_thickness", self.wall_thickness)?;
        require_positive("skirt.flare_length", self.flare_length)?;
        if !(self.flare_angle > 0.0 && self.flare_angle <= 90.0) {
            return Err(invalid(
                "skirt.flare_angle",
                format!("must be in (0, 90], got {}", self.flare_angle),
            ));
        }
        Ok(())
    }
}

/// Sparse key grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Gap between neighbouring keys in the grid.
    pub key_gap: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { key_gap: 2.5 }
    }
}

/// All configuration sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeebConfig {
    /// Switch socket.
    pub socket: SocketConfig,
    /// Keycap.
    pub keycap: KeycapConfig,
    /// Key assembly.
    pub key: KeyConfig,
    /// Curved column.
    pub column: ColumnConfig,
    /// Flared skirt.
    pub skirt: SkirtConfig,
    /// Key grid.
    pub grid: GridConfig,
}

impl KeebConfig {
    /// Parse and validate a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: KeebConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Serialize every section as pretty TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every section's ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket.validate()?;
        self.keycap.validate()?;
        self.column.validate()?;
        self.skirt.validate()?;
        if !(self.grid.key_gap.is_finite() && self.grid.key_gap >= 0.0) {
            return Err(invalid("grid.key_gap", "must not be negative"));
        }
        Ok(())
    }
}

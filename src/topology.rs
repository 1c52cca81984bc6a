//! In-memory model of the probed display topology
//!
//! Connectors come out of the probe in first-seen order and keep that order
//! everywhere; the synthesized reconfiguration command depends on it.

use std::cmp::Reverse;

use tracing::warn;

use crate::error::SetupError;
use crate::types::{Resolution, ScreenSetup};

/// One physical display output as reported by the graphics subsystem.
#[derive(Debug, Clone)]
pub struct Connector {
    pub name: String,
    /// EDID as a hex string, accumulated by the probe. Only connected
    /// displays report one, and not even all of those do.
    pub edid: Option<String>,
    resolutions: Vec<Resolution>,
    preferred: Option<Resolution>,
    /// Resolution this connector was set to the last time the attached
    /// display was seen, fed in from the preference store.
    pub previous: Option<Resolution>,
}

impl Connector {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            edid: None,
            resolutions: Vec::new(),
            preferred: None,
            previous: None,
        }
    }

    /// A connector counts as connected iff it reported at least one
    /// resolution. The EDID is not reliable enough for this.
    pub fn is_connected(&self) -> bool {
        !self.resolutions.is_empty()
    }

    pub fn resolutions(&self) -> &[Resolution] {
        &self.resolutions
    }

    pub fn add_resolution(&mut self, resolution: Resolution) {
        if !self.resolutions.contains(&resolution) {
            self.resolutions.push(resolution);
        }
    }

    /// Marks the display's self-reported preferred resolution. It must have
    /// been added first.
    pub fn mark_preferred(&mut self, resolution: Resolution) {
        debug_assert!(self.resolutions.contains(&resolution));
        self.preferred = Some(resolution);
    }

    pub fn preferred(&self) -> Option<Resolution> {
        self.preferred
    }

    pub fn append_edid(&mut self, hex_chunk: &str) {
        match &mut self.edid {
            Some(edid) => edid.push_str(hex_chunk),
            None => self.edid = Some(hex_chunk.to_string()),
        }
    }

    /// The binary identification blob used as the preference store key.
    pub fn edid_bytes(&self) -> Option<Vec<u8>> {
        let edid = self.edid.as_ref()?;
        match hex::decode(edid) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(connector = %self.name, error = %e, "ignoring undecodable EDID");
                None
            }
        }
    }
}

/// First candidate name, in the caller's priority order, that exists among
/// the connectors and has a display attached.
pub fn find_available(candidates: &[String], connectors: &[Connector]) -> Option<usize> {
    candidates.iter().find_map(|name| {
        connectors
            .iter()
            .position(|c| &c.name == name && c.is_connected())
    })
}

/// Resolutions available on both connectors, largest first.
pub fn common_resolutions(a: &Connector, b: &Connector) -> Vec<Resolution> {
    let mut common: Vec<Resolution> = a
        .resolutions
        .iter()
        .filter(|r| b.resolutions.contains(r))
        .copied()
        .collect();
    common.sort_by_key(|r| Reverse(r.pixel_count()));
    common
}

/// Resolutions of one connector in the order they should be offered:
/// the previously applied one first, then the display's preferred one,
/// then by size.
pub fn ranked_resolutions(connector: &Connector) -> Vec<Resolution> {
    let mut ranked = connector.resolutions.clone();
    ranked.sort_by_key(|r| {
        (
            Some(*r) != connector.previous,
            Some(*r) != connector.preferred,
            Reverse(r.pixel_count()),
        )
    });
    ranked
}

/// The complete picture of one run: every probed connector, which of them is
/// the internal panel, which (if any) carries the external display, and the
/// layout remembered for that display.
#[derive(Debug)]
pub struct ScreenSituation {
    pub connectors: Vec<Connector>,
    internal: usize,
    external: Option<usize>,
    pub previous_setup: Option<ScreenSetup>,
}

impl ScreenSituation {
    /// Picks the internal and external connector from the probed list.
    ///
    /// `external_candidates` defaults to every connector that is not the
    /// internal one, in discovery order. Not finding an external display is
    /// fine; not finding the internal panel is not.
    pub fn classify(
        connectors: Vec<Connector>,
        internal_candidates: &[String],
        external_candidates: Option<&[String]>,
    ) -> Result<Self, SetupError> {
        let internal = find_available(internal_candidates, &connectors).ok_or_else(|| {
            SetupError::Configuration(
                "no internal connector found; use the config file to specify it manually".into(),
            )
        })?;

        let default_externals: Vec<String>;
        let external_candidates = match external_candidates {
            Some(names) => names,
            None => {
                default_externals = connectors
                    .iter()
                    .filter(|c| c.name != connectors[internal].name)
                    .map(|c| c.name.clone())
                    .collect();
                &default_externals
            }
        };
        let external = find_available(external_candidates, &connectors);
        if external == Some(internal) {
            return Err(SetupError::Configuration(format!(
                "internal and external connector are both {}; fix the config file",
                connectors[internal].name
            )));
        }

        Ok(Self {
            connectors,
            internal,
            external,
            previous_setup: None,
        })
    }

    pub fn internal(&self) -> &Connector {
        &self.connectors[self.internal]
    }

    pub fn external(&self) -> Option<&Connector> {
        self.external.map(|i| &self.connectors[i])
    }

    pub fn internal_index(&self) -> usize {
        self.internal
    }

    pub fn external_index(&self) -> Option<usize> {
        self.external
    }

    /// Records the setup remembered for the attached external display and
    /// feeds its resolutions into both connectors' ranking.
    pub fn attach_previous_setup(&mut self, setup: Option<ScreenSetup>) {
        if let Some(setup) = &setup {
            self.connectors[self.internal].previous = setup.internal;
            if let Some(external) = self.external {
                self.connectors[external].previous = setup.external;
            }
        }
        self.previous_setup = setup;
    }

    /// Resolutions both screens support; only meaningful with an external
    /// display attached.
    pub fn common_resolutions(&self) -> Result<Vec<Resolution>, SetupError> {
        let external = self.external().ok_or_else(|| {
            SetupError::Configuration("no external display to share a resolution with".into())
        })?;
        Ok(common_resolutions(self.internal(), external))
    }
}

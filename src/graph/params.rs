//! Effect identities, the parameter range table, and observable snapshots.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Error;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Filter,
    Delay,
    Reverb,
    Distortion,
}

impl EffectKind {
    pub const ALL: [EffectKind; 4] = [
        EffectKind::Filter,
        EffectKind::Delay,
        EffectKind::Reverb,
        EffectKind::Distortion,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EffectKind::Filter => "filter",
            EffectKind::Delay => "delay",
            EffectKind::Reverb => "reverb",
            EffectKind::Distortion => "distortion",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// The parameter forced to zero when this effect is disabled.
    ///
    /// Distortion mutes through its amount, the others through wet. The two
    /// are not equivalent: wet is a mix fader, amount changes the shaping.
    pub fn mute_param(self) -> EffectParam {
        match self {
            EffectKind::Filter => EffectParam::FilterWet,
            EffectKind::Delay => EffectParam::DelayWet,
            EffectKind::Reverb => EffectParam::ReverbWet,
            EffectKind::Distortion => EffectParam::DistortionAmount,
        }
    }

    pub fn params(self) -> &'static [EffectParam] {
        use EffectParam::*;
        match self {
            EffectKind::Filter => &[FilterFrequency, FilterDepth, FilterResonance, FilterWet],
            EffectKind::Delay => &[DelayTime, DelayFeedback, DelayWet],
            EffectKind::Reverb => &[ReverbDecay, ReverbPreDelay, ReverbWet],
            EffectKind::Distortion => &[DistortionAmount, DistortionWet],
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EffectKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EffectKind::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownEffect(s.to_string()))
    }
}

/// Every tunable parameter, one variant per `UPDATE_<EFFECT>_<PARAM>` command.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectParam {
    /// Auto-filter LFO rate in Hz
    FilterFrequency,
    /// Auto-filter sweep depth (0-1)
    FilterDepth,
    /// Filter Q
    FilterResonance,
    FilterWet,
    /// Delay time in seconds
    DelayTime,
    DelayFeedback,
    DelayWet,
    /// Reverb RT60 in seconds
    ReverbDecay,
    /// Reverb pre-delay in seconds
    ReverbPreDelay,
    ReverbWet,
    /// Waveshaper amount (0-1)
    DistortionAmount,
    DistortionWet,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
    pub default: f32,
}

impl ParamRange {
    const fn new(min: f32, max: f32, default: f32) -> Self {
        Self { min, max, default }
    }

    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default;
        }
        value.clamp(self.min, self.max)
    }
}

impl EffectParam {
    pub fn effect(self) -> EffectKind {
        use EffectParam::*;
        match self {
            FilterFrequency | FilterDepth | FilterResonance | FilterWet => EffectKind::Filter,
            DelayTime | DelayFeedback | DelayWet => EffectKind::Delay,
            ReverbDecay | ReverbPreDelay | ReverbWet => EffectKind::Reverb,
            DistortionAmount | DistortionWet => EffectKind::Distortion,
        }
    }

    /// Parameter name within its effect.
    pub fn name(self) -> &'static str {
        use EffectParam::*;
        match self {
            FilterFrequency => "frequency",
            FilterDepth => "depth",
            FilterResonance => "resonance",
            DelayTime => "time",
            DelayFeedback => "feedback",
            ReverbDecay => "decay",
            ReverbPreDelay => "preDelay",
            DistortionAmount => "amount",
            FilterWet | DelayWet | ReverbWet | DistortionWet => "wet",
        }
    }

    /// The fixed range table callers are expected to respect.
    pub fn range(self) -> ParamRange {
        use EffectParam::*;
        match self {
            FilterFrequency => ParamRange::new(0.1, 10.0, 1.0),
            FilterDepth => ParamRange::new(0.0, 1.0, 0.6),
            FilterResonance => ParamRange::new(0.1, 20.0, 1.0),
            FilterWet => ParamRange::new(0.0, 1.0, 0.5),
            DelayTime => ParamRange::new(0.01, 1.0, 0.25),
            DelayFeedback => ParamRange::new(0.0, 0.9, 0.3),
            DelayWet => ParamRange::new(0.0, 1.0, 0.3),
            ReverbDecay => ParamRange::new(0.1, 10.0, 1.5),
            ReverbPreDelay => ParamRange::new(0.0, 0.5, 0.01),
            ReverbWet => ParamRange::new(0.0, 1.0, 0.3),
            DistortionAmount => ParamRange::new(0.0, 1.0, 0.4),
            DistortionWet => ParamRange::new(0.0, 1.0, 0.5),
        }
    }

    pub fn default_value(self) -> f32 {
        self.range().default
    }

    /// Changing these restarts the auto-filter LFO.
    pub fn restarts_lfo(self) -> bool {
        matches!(self, EffectParam::FilterFrequency | EffectParam::FilterDepth)
    }

    /// Look up `effect.param` by name, e.g. `("delay", "feedback")`.
    pub fn lookup(effect: &str, param: &str) -> Result<EffectParam, Error> {
        let kind: EffectKind = effect.parse()?;
        kind.params()
            .iter()
            .copied()
            .find(|p| p.name().eq_ignore_ascii_case(param.trim()))
            .ok_or_else(|| Error::UnknownParam(format!("{}.{}", kind, param)))
    }
}

impl fmt::Display for EffectParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.effect(), self.name())
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterParams {
    pub frequency: f32,
    pub depth: f32,
    pub resonance: f32,
    pub wet: f32,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            frequency: EffectParam::FilterFrequency.default_value(),
            depth: EffectParam::FilterDepth.default_value(),
            resonance: EffectParam::FilterResonance.default_value(),
            wet: EffectParam::FilterWet.default_value(),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayParams {
    pub time: f32,
    pub feedback: f32,
    pub wet: f32,
}

impl Default for DelayParams {
    fn default() -> Self {
        Self {
            time: EffectParam::DelayTime.default_value(),
            feedback: EffectParam::DelayFeedback.default_value(),
            wet: EffectParam::DelayWet.default_value(),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbParams {
    pub decay: f32,
    pub pre_delay: f32,
    pub wet: f32,
}

impl Default for ReverbParams {
    fn default() -> Self {
        Self {
            decay: EffectParam::ReverbDecay.default_value(),
            pre_delay: EffectParam::ReverbPreDelay.default_value(),
            wet: EffectParam::ReverbWet.default_value(),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistortionParams {
    pub amount: f32,
    pub wet: f32,
}

impl Default for DistortionParams {
    fn default() -> Self {
        Self {
            amount: EffectParam::DistortionAmount.default_value(),
            wet: EffectParam::DistortionWet.default_value(),
        }
    }
}

/// Set of audible effects.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActiveEffects(u8);

impl ActiveEffects {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        EffectKind::ALL.into_iter().collect()
    }

    pub fn insert(&mut self, kind: EffectKind) {
        self.0 |= 1 << kind.index();
    }

    pub fn remove(&mut self, kind: EffectKind) {
        self.0 &= !(1 << kind.index());
    }

    pub fn contains(&self, kind: EffectKind) -> bool {
        self.0 & (1 << kind.index()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = EffectKind> + '_ {
        EffectKind::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

impl FromIterator<EffectKind> for ActiveEffects {
    fn from_iter<I: IntoIterator<Item = EffectKind>>(iter: I) -> Self {
        let mut set = ActiveEffects::empty();
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

/// Per-effect parameter values plus the active set, as seen from outside.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EffectsSnapshot {
    /// `false` when the graph is disposed; parameter records are then defaults.
    pub allocated: bool,
    pub active: ActiveEffects,
    pub filter: FilterParams,
    pub delay: DelayParams,
    pub reverb: ReverbParams,
    pub distortion: DistortionParams,
}

impl EffectsSnapshot {
    pub fn get(&self, param: EffectParam) -> f32 {
        use EffectParam::*;
        match param {
            FilterFrequency => self.filter.frequency,
            FilterDepth => self.filter.depth,
            FilterResonance => self.filter.resonance,
            FilterWet => self.filter.wet,
            DelayTime => self.delay.time,
            DelayFeedback => self.delay.feedback,
            DelayWet => self.delay.wet,
            ReverbDecay => self.reverb.decay,
            ReverbPreDelay => self.reverb.pre_delay,
            ReverbWet => self.reverb.wet,
            DistortionAmount => self.distortion.amount,
            DistortionWet => self.distortion.wet,
        }
    }
}

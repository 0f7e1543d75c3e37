use bitflags::bitflags;

/// Conversion result register.
pub const REG_CONVERSION: u8 = 0x00;
/// Configuration register.
pub const REG_CONFIG: u8 = 0x01;

bitflags! {
    /// Fixed-position bits of the 16-bit config register. The multiplexer,
    /// gain and data-rate fields are multi-bit and contributed by
    /// [`Channel`], [`Gain`] and [`DataRate`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Config: u16 {
        /// Begin a single conversion (write) / conversion idle (read).
        const OS_SINGLE = 0x8000;
        /// Power-down single-shot mode.
        const MODE_SINGLE = 0x0100;
        /// Disable the comparator and leave ALERT/RDY high-impedance.
        const COMP_QUE_DISABLE = 0x0003;
    }
}

/// Single-ended input channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    A0,
    A1,
    A2,
    A3,
}

impl Channel {
    /// MUX field (bits 14:12), single-ended encodings 0b100..=0b111.
    pub(crate) fn mux_bits(self) -> u16 {
        0x4000 | ((self as u16) << 12)
    }
}

/// Programmable gain amplifier setting, named by the amplification factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Gain {
    /// ±6.144 V full scale.
    TwoThirds,
    /// ±4.096 V full scale.
    #[default]
    One,
    /// ±2.048 V full scale.
    Two,
    /// ±1.024 V full scale.
    Four,
    /// ±0.512 V full scale.
    Eight,
    /// ±0.256 V full scale.
    Sixteen,
}

impl Gain {
    /// Full-scale range in volts for this gain.
    pub fn full_scale_v(self) -> f64 {
        match self {
            Gain::TwoThirds => 6.144,
            Gain::One => 4.096,
            Gain::Two => 2.048,
            Gain::Four => 1.024,
            Gain::Eight => 0.512,
            Gain::Sixteen => 0.256,
        }
    }

    /// PGA field (bits 11:9).
    pub(crate) fn bits(self) -> u16 {
        (self as u16) << 9
    }
}

/// Conversion data rate in samples per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataRate {
    Sps128,
    Sps250,
    Sps490,
    Sps920,
    #[default]
    Sps1600,
    Sps2400,
    Sps3300,
}

impl DataRate {
    pub fn samples_per_second(self) -> u64 {
        match self {
            DataRate::Sps128 => 128,
            DataRate::Sps250 => 250,
            DataRate::Sps490 => 490,
            DataRate::Sps920 => 920,
            DataRate::Sps1600 => 1600,
            DataRate::Sps2400 => 2400,
            DataRate::Sps3300 => 3300,
        }
    }

    /// DR field (bits 7:5).
    pub(crate) fn bits(self) -> u16 {
        (self as u16) << 5
    }
}

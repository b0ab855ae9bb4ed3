//! Instruction timing, in nanoseconds, per CPU model.
//!
//! Every value defaults to 0 when a model's original documentation didn't
//! specify it (e.g. baseline NOVA never lists `time_isz_skp` — its ISZ/DSZ
//! skip path costs nothing extra).

/// Nanosecond cost table for one CPU model. All fields are added to the
/// running instruction `duration`; several instructions add from more
/// than one field (e.g. indirect addressing adds `time_indir_adr` on top
/// of the base opcode cost).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timing {
    pub model: &'static str,
    pub time_lda: u64,
    pub time_sta: u64,
    pub time_isz: u64,
    pub time_isz_skp: u64,
    pub time_jmp: u64,
    pub time_jsr: u64,
    pub time_indir_adr: u64,
    pub time_base_reg: u64,
    pub time_auto_idx: u64,
    pub time_alu_1: u64,
    pub time_alu_2: u64,
    pub time_alu_skip: u64,
    pub time_io_input: u64,
    pub time_io_nio: u64,
    pub time_io_output: u64,
    pub time_io_scp: u64,
    pub time_io_skp: u64,
    pub time_io_skp_skip: u64,
    pub time_io_inta: u64,
}

/// The baseline NOVA (the original 1969 machine).
pub const NOVA: Timing = Timing {
    model: "NOVA",
    time_lda: 5200,
    time_sta: 5500,
    time_isz: 5200,
    time_isz_skp: 0,
    time_jmp: 5600,
    time_jsr: 3500,
    time_indir_adr: 2600,
    time_base_reg: 300,
    time_auto_idx: 0,
    time_alu_1: 5600,
    time_alu_2: 5900,
    time_io_input: 4400,
    time_io_nio: 4400,
    time_io_output: 4700,
    time_io_scp: 0,
    time_io_skp: 4400,
    time_io_skp_skip: 0,
    time_io_inta: 4400,
    time_alu_skip: 0,
};

/// The NOVA 1200, a cost-reduced follow-on.
pub const NOVA1200: Timing = Timing {
    model: "NOVA 1200",
    time_lda: 2550,
    time_sta: 2550,
    time_isz: 3150,
    time_isz_skp: 1350,
    time_jmp: 1350,
    time_jsr: 1350,
    time_indir_adr: 1200,
    time_base_reg: 0,
    time_auto_idx: 600,
    time_alu_1: 1350,
    time_alu_2: 1350,
    time_alu_skip: 1350,
    time_io_input: 2550,
    time_io_nio: 3150,
    time_io_output: 3150,
    time_io_scp: 0,
    time_io_skp: 2550,
    time_io_skp_skip: 0,
    time_io_inta: 2550,
};

/// The NOVA 800.
pub const NOVA800: Timing = Timing {
    model: "NOVA 800",
    time_lda: 1600,
    time_sta: 1600,
    time_isz: 1800,
    time_isz_skp: 0,
    time_jmp: 800,
    time_jsr: 800,
    time_indir_adr: 800,
    time_base_reg: 0,
    time_auto_idx: 200,
    time_alu_1: 800,
    time_alu_2: 800,
    time_alu_skip: 200,
    time_io_input: 2200,
    time_io_nio: 2200,
    time_io_output: 2200,
    time_io_scp: 600,
    time_io_skp: 1400,
    time_io_skp_skip: 200,
    time_io_inta: 2200,
};

/// The NOVA 2 and the RC3600/RC3700-family machines derived from it
/// (RC7000, RC3603, RC3703, RC3803). The RC37/38-series "CPU720" boards
/// are NOVA 2-class timing with the extension instruction set layered on
/// top (see `nova-cpu`'s `cpu720` module), so they share this table.
pub const NOVA2: Timing = Timing {
    model: "NOVA 2",
    time_lda: 2000,
    time_sta: 2000,
    time_isz: 2000,
    time_isz_skp: 0,
    time_jmp: 1000,
    time_jsr: 1000,
    time_indir_adr: 1000,
    time_base_reg: 0,
    time_auto_idx: 200,
    time_alu_1: 1000,
    time_alu_2: 1000,
    time_alu_skip: 200,
    time_io_input: 2200,
    time_io_nio: 2200,
    time_io_output: 2200,
    time_io_scp: 600,
    time_io_skp: 1400,
    time_io_skp_skip: 200,
    time_io_inta: 2200,
};

/// The concrete CPU models the `cpu model` CLI command can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CpuModel {
    #[default]
    Nova,
    Nova1200,
    Nova800,
    Nova2,
    Rc7000,
    Rc3603,
    Rc3703,
    Rc3803,
}

impl CpuModel {
    #[must_use]
    pub const fn timing(self) -> Timing {
        match self {
            CpuModel::Nova => NOVA,
            CpuModel::Nova1200 => NOVA1200,
            CpuModel::Nova800 => NOVA800,
            CpuModel::Nova2 | CpuModel::Rc7000 | CpuModel::Rc3603 | CpuModel::Rc3703 | CpuModel::Rc3803 => NOVA2,
        }
    }

    /// Whether this model implements the CPU720 extension instruction
    /// set (IDFY, LDB/STB, BMOVE/WMOVE/COMP, the list primitives, FETCH
    /// and the TAKE variants).
    #[must_use]
    pub const fn has_cpu720_extensions(self) -> bool {
        matches!(self, CpuModel::Rc3703 | CpuModel::Rc3803)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            CpuModel::Nova => "NOVA",
            CpuModel::Nova1200 => "NOVA 1200",
            CpuModel::Nova800 => "NOVA 800",
            CpuModel::Nova2 => "NOVA 2",
            CpuModel::Rc7000 => "RC7000",
            CpuModel::Rc3603 => "RC3603",
            CpuModel::Rc3703 => "RC3703",
            CpuModel::Rc3803 => "RC3803",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nova_isz_skp_defaults_to_zero() {
        assert_eq!(NOVA.time_isz_skp, 0);
    }

    #[test]
    fn cpu720_models_flag_extensions() {
        assert!(CpuModel::Rc3703.has_cpu720_extensions());
        assert!(CpuModel::Rc3803.has_cpu720_extensions());
        assert!(!CpuModel::Nova.has_cpu720_extensions());
        assert!(!CpuModel::Rc3603.has_cpu720_extensions());
    }

    #[test]
    fn default_model_is_nova() {
        assert_eq!(CpuModel::default().timing().model, "NOVA");
    }
}

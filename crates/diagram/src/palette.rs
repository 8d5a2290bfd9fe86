use legis_core::schema::Institution;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstitutionColors {
    pub background: &'static str,
    pub border: &'static str,
    pub label: &'static str,
}

pub fn institution_colors(institution: Institution) -> InstitutionColors {
    match institution {
        Institution::LowerHouse => InstitutionColors {
            background: "#ef4444",
            border: "#dc2626",
            label: "Sejm",
        },
        Institution::UpperHouse => InstitutionColors {
            background: "#3b82f6",
            border: "#2563eb",
            label: "Senat",
        },
        Institution::President => InstitutionColors {
            background: "#8b5cf6",
            border: "#7c3aed",
            label: "Prezydent",
        },
        Institution::ConstitutionalCourt => InstitutionColors {
            background: "#f59e0b",
            border: "#d97706",
            label: "Trybunał Konstytucyjny",
        },
        Institution::Publication => InstitutionColors {
            background: "#22c55e",
            border: "#16a34a",
            label: "Publikacja",
        },
    }
}

pub const CANVAS: &str = "#ffffff";
pub const ALTERNATIVE: &str = "#9ca3af";
pub const MUTED_TEXT: &str = "#6b7280";
pub const FAINT_TEXT: &str = "#9ca3af";
pub const HAIRLINE: &str = "#e5e7eb";
pub const REJECTED_FILL: &str = "#f5f5f5";
pub const SELECTION: &str = "#3b82f6";
pub const CURRENT_RING: &str = "#fbbf24";
pub const NOW_LINE: &str = "#ef4444";

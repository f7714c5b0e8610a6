//! Status enums for backend resources.
//!
//! Wire values match what the backend stores (`"CRE"`, `"En Proceso"`, ...);
//! `label()` is the Spanish text shown in tables and badges.

use serde::{Deserialize, Serialize};

/// Order (pedido) status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PedidoEstado {
    #[default]
    #[serde(rename = "CRE")]
    Creado,
    #[serde(rename = "PAG")]
    Pagado,
    #[serde(rename = "ENV")]
    Enviado,
    #[serde(rename = "ENT")]
    Entregado,
    #[serde(rename = "CAN")]
    Cancelado,
}

impl PedidoEstado {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Creado,
        Self::Pagado,
        Self::Enviado,
        Self::Entregado,
        Self::Cancelado,
    ];

    /// Backend code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Creado => "CRE",
            Self::Pagado => "PAG",
            Self::Enviado => "ENV",
            Self::Entregado => "ENT",
            Self::Cancelado => "CAN",
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Creado => "Creado",
            Self::Pagado => "Pagado",
            Self::Enviado => "Enviado",
            Self::Entregado => "Entregado",
            Self::Cancelado => "Cancelado",
        }
    }

    /// Parse a backend code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }
}

/// Repair service ticket status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ServicioEstado {
    #[default]
    Pendiente,
    #[serde(rename = "En Proceso")]
    EnProceso,
    #[serde(alias = "Completado")]
    Reparado,
    Entregado,
    Cancelado,
    Revision,
}

impl ServicioEstado {
    /// Every status accepted by the service form.
    pub const ALL: [Self; 6] = [
        Self::Pendiente,
        Self::EnProceso,
        Self::Reparado,
        Self::Entregado,
        Self::Cancelado,
        Self::Revision,
    ];

    /// Wire value, which doubles as the display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pendiente => "Pendiente",
            Self::EnProceso => "En Proceso",
            Self::Reparado => "Reparado",
            Self::Entregado => "Entregado",
            Self::Cancelado => "Cancelado",
            Self::Revision => "Revision",
        }
    }

    /// Parse a wire value.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }

    /// Whether the ticket is still open.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Pendiente | Self::EnProceso | Self::Revision)
    }
}

/// Payment status of a service sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EstadoPago {
    #[default]
    Pendiente,
    Parcial,
    Pagado,
}

impl EstadoPago {
    pub const ALL: [Self; 3] = [Self::Pendiente, Self::Parcial, Self::Pagado];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pendiente => "Pendiente",
            Self::Parcial => "Parcial",
            Self::Pagado => "Pagado",
        }
    }

    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }
}

/// Inventory movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TipoMovimiento {
    #[serde(rename = "ENT")]
    Entrada,
    #[serde(rename = "SAL")]
    Salida,
}

impl TipoMovimiento {
    pub const ALL: [Self; 2] = [Self::Entrada, Self::Salida];

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Entrada => "ENT",
            Self::Salida => "SAL",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Entrada => "Entrada",
            Self::Salida => "Salida",
        }
    }

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }
}

/// Physical condition of a catalog part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RefaccionEstado {
    #[default]
    #[serde(rename = "NVO")]
    Nuevo,
    #[serde(rename = "UBS")]
    Usado,
    #[serde(rename = "REC")]
    Reacondicionado,
}

impl RefaccionEstado {
    pub const ALL: [Self; 3] = [Self::Nuevo, Self::Usado, Self::Reacondicionado];

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Nuevo => "NVO",
            Self::Usado => "UBS",
            Self::Reacondicionado => "REC",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Nuevo => "Nuevo",
            Self::Usado => "Usado",
            Self::Reacondicionado => "Reacondicionado",
        }
    }

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.code() == code)
    }
}

/// Kind of delivery location captured in the extra-info step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipoLugar {
    Casa,
    Edificio,
    Abarrotes,
    Otro,
}

impl TipoLugar {
    pub const ALL: [Self; 4] = [Self::Casa, Self::Edificio, Self::Abarrotes, Self::Otro];

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Casa => "casa",
            Self::Edificio => "edificio",
            Self::Abarrotes => "abarrotes",
            Self::Otro => "otro",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Casa => "Casa",
            Self::Edificio => "Edificio",
            Self::Abarrotes => "Tienda de abarrotes",
            Self::Otro => "Otro",
        }
    }

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_pedido_estado_wire_codes() {
        assert_eq!(serde_json::to_string(&PedidoEstado::Pagado).unwrap(), "\"PAG\"");
        let parsed: PedidoEstado = serde_json::from_str("\"CAN\"").unwrap();
        assert_eq!(parsed, PedidoEstado::Cancelado);
        assert_eq!(PedidoEstado::from_code("ENV"), Some(PedidoEstado::Enviado));
        assert_eq!(PedidoEstado::from_code("XXX"), None);
    }

    #[test]
    fn test_servicio_estado_en_proceso_has_space() {
        assert_eq!(
            serde_json::to_string(&ServicioEstado::EnProceso).unwrap(),
            "\"En Proceso\""
        );
        assert_eq!(
            ServicioEstado::from_label("En Proceso"),
            Some(ServicioEstado::EnProceso)
        );
        assert!(ServicioEstado::Revision.is_open());
        assert!(!ServicioEstado::Entregado.is_open());
    }

    #[test]
    fn test_label_round_trips_for_every_variant() {
        for estado in EstadoPago::ALL {
            assert_eq!(EstadoPago::from_label(estado.label()), Some(estado));
        }
        for tipo in TipoLugar::ALL {
            assert_eq!(TipoLugar::from_code(tipo.code()), Some(tipo));
        }
        for estado in RefaccionEstado::ALL {
            assert_eq!(RefaccionEstado::from_code(estado.code()), Some(estado));
        }
    }
}

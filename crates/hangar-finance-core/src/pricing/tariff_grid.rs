use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::HangarFinanceError;
use crate::HangarFinanceResult;

// ---------------------------------------------------------------------------
// Grid types
// ---------------------------------------------------------------------------

/// Structural family of the canopy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingType {
    /// Single-pitch roof, panels on the one slope
    SingleSlope,
    /// Dual-pitch roof, panels on the south-facing slope
    DoubleSlope,
    /// Open parking canopy
    Carport,
}

impl fmt::Display for BuildingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BuildingType::SingleSlope => "single_slope",
            BuildingType::DoubleSlope => "double_slope",
            BuildingType::Carport => "carport",
        };
        f.write_str(s)
    }
}

/// One tabulated configuration: a number of spans and its price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TariffRow {
    pub spans: u32,
    /// Turnkey building price (€)
    pub tarif: Decimal,
    /// Reference installed power for this configuration
    pub kwc: Decimal,
}

/// Price table for one building type at one width, ordered by span count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TariffTable {
    pub building_type: BuildingType,
    pub width_m: Decimal,
    pub rows: Vec<TariffRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffGrid {
    pub tables: Vec<TariffTable>,
}

/// Result of a tariff lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingCostLookup {
    pub tarif: Decimal,
    pub kwc_grid: Decimal,
    /// The span count is tabulated
    pub exact: bool,
    /// Values were interpolated between two tabulated span counts
    pub interpolated: bool,
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

impl TariffGrid {
    pub fn table(&self, building_type: BuildingType, width_m: Decimal) -> Option<&TariffTable> {
        self.tables
            .iter()
            .find(|t| t.building_type == building_type && t.width_m == width_m)
    }

    /// See [`lookup_building_cost`].
    pub fn lookup(
        &self,
        building_type: BuildingType,
        width_m: Decimal,
        spans: u32,
    ) -> Option<BuildingCostLookup> {
        let rows = &self.table(building_type, width_m)?.rows;
        let first = rows.first()?;
        let last = rows.last()?;

        if let Some(row) = rows.iter().find(|r| r.spans == spans) {
            return Some(BuildingCostLookup {
                tarif: row.tarif,
                kwc_grid: row.kwc,
                exact: true,
                interpolated: false,
            });
        }

        // Out of range: clamp to the boundary row, never extrapolate
        if spans < first.spans {
            return Some(clamped(first));
        }
        if spans > last.spans {
            return Some(clamped(last));
        }

        let upper = rows.iter().position(|r| r.spans > spans)?;
        let lo = &rows[upper - 1];
        let hi = &rows[upper];
        let t = Decimal::from(spans - lo.spans) / Decimal::from(hi.spans - lo.spans);

        Some(BuildingCostLookup {
            tarif: lo.tarif + (hi.tarif - lo.tarif) * t,
            kwc_grid: lo.kwc + (hi.kwc - lo.kwc) * t,
            exact: false,
            interpolated: true,
        })
    }

    /// Parse a grid from JSON and validate it.
    pub fn from_json(json: &str) -> HangarFinanceResult<Self> {
        let grid: TariffGrid = serde_json::from_str(json)?;
        grid.validate()?;
        Ok(grid)
    }

    /// Every table non-empty, span counts strictly increasing, values
    /// non-negative, one table per (type, width).
    pub fn validate(&self) -> HangarFinanceResult<()> {
        for (i, table) in self.tables.iter().enumerate() {
            let name = format!("{} {} m", table.building_type, table.width_m);

            if table.rows.is_empty() {
                return Err(HangarFinanceError::InvalidTariffGrid(format!(
                    "{name}: table has no rows"
                )));
            }
            if table.width_m <= Decimal::ZERO {
                return Err(HangarFinanceError::InvalidTariffGrid(format!(
                    "{name}: width must be positive"
                )));
            }
            if self.tables[..i]
                .iter()
                .any(|t| t.building_type == table.building_type && t.width_m == table.width_m)
            {
                return Err(HangarFinanceError::InvalidTariffGrid(format!(
                    "{name}: duplicate table"
                )));
            }
            for pair in table.rows.windows(2) {
                if pair[1].spans <= pair[0].spans {
                    return Err(HangarFinanceError::InvalidTariffGrid(format!(
                        "{name}: span counts must be strictly increasing ({} then {})",
                        pair[0].spans, pair[1].spans
                    )));
                }
            }
            if let Some(row) = table
                .rows
                .iter()
                .find(|r| r.tarif < Decimal::ZERO || r.kwc < Decimal::ZERO)
            {
                return Err(HangarFinanceError::InvalidTariffGrid(format!(
                    "{name}: negative value at {} spans",
                    row.spans
                )));
            }
        }
        Ok(())
    }

    /// Reference grid shipped with the crate.
    pub fn builtin() -> Self {
        TariffGrid {
            tables: vec![
                table(
                    BuildingType::SingleSlope,
                    dec!(15),
                    &[
                        (3, dec!(62000), dec!(99)),
                        (5, dec!(98500), dec!(165)),
                        (8, dec!(151000), dec!(264)),
                        (12, dec!(219000), dec!(396)),
                    ],
                ),
                table(
                    BuildingType::SingleSlope,
                    dec!(20),
                    &[
                        (3, dec!(79000), dec!(132)),
                        (5, dec!(126000), dec!(220)),
                        (8, dec!(193500), dec!(352)),
                        (12, dec!(281000), dec!(528)),
                    ],
                ),
                table(
                    BuildingType::DoubleSlope,
                    dec!(24),
                    &[
                        (4, dec!(118000), dec!(100)),
                        (6, dec!(169000), dec!(150)),
                        (10, dec!(268000), dec!(250)),
                        (14, dec!(362000), dec!(350)),
                    ],
                ),
                table(
                    BuildingType::Carport,
                    dec!(5),
                    &[
                        (10, dec!(41000), dec!(36)),
                        (20, dec!(78000), dec!(72)),
                        (40, dec!(149000), dec!(144)),
                    ],
                ),
            ],
        }
    }
}

fn table(building_type: BuildingType, width_m: Decimal, rows: &[(u32, Decimal, Decimal)]) -> TariffTable {
    TariffTable {
        building_type,
        width_m,
        rows: rows
            .iter()
            .map(|&(spans, tarif, kwc)| TariffRow { spans, tarif, kwc })
            .collect(),
    }
}

fn clamped(row: &TariffRow) -> BuildingCostLookup {
    BuildingCostLookup {
        tarif: row.tarif,
        kwc_grid: row.kwc,
        exact: false,
        interpolated: false,
    }
}

/// Construction tariff and reference power for a building configuration.
///
/// Tabulated span counts are returned as-is. Span counts between two rows
/// are linearly interpolated for both tariff and power; span counts outside
/// the table clamp to the nearest boundary row. `None` when the grid has no
/// table for this type and width.
pub fn lookup_building_cost(
    grid: &TariffGrid,
    building_type: BuildingType,
    width_m: Decimal,
    spans: u32,
) -> Option<BuildingCostLookup> {
    grid.lookup(building_type, width_m, spans)
}

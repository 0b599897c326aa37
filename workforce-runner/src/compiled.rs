//! Compiled workforce datasets.
//!
//! Five small tables assembled by hand from the BLS "Foreign-born Workers:
//! Labor Force Characteristics" annual releases. Figures that a release did
//! not publish are `None` and written as empty cells.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

pub const WORKFORCE_SIZE_FILE: &str = "workforce_size_share.csv";
pub const PARTICIPATION_FILE: &str = "labor_force_participation_unemployment.csv";
pub const EARNINGS_FILE: &str = "median_weekly_earnings.csv";
pub const EDUCATION_FILE: &str = "educational_attainment.csv";
pub const OCCUPATION_FILE: &str = "occupational_distribution.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Group {
    #[serde(rename = "Foreign_Born")]
    ForeignBorn,
    #[serde(rename = "Native_Born")]
    NativeBorn,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkforceSizeRow {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Foreign_Born_Workers_Millions")]
    pub foreign_born_workers_millions: f64,
    #[serde(rename = "Foreign_Born_Share_of_Total_LF_%")]
    pub foreign_born_share_pct: f64,
    #[serde(rename = "Total_US_Labor_Force_Millions")]
    pub total_labor_force_millions: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipationRow {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Foreign_Born_LF_Participation_%")]
    pub fb_participation: Option<f64>,
    #[serde(rename = "Native_Born_LF_Participation_%")]
    pub nb_participation: Option<f64>,
    #[serde(rename = "Foreign_Born_Men_LF_Participation_%")]
    pub fb_men_participation: Option<f64>,
    #[serde(rename = "Native_Born_Men_LF_Participation_%")]
    pub nb_men_participation: Option<f64>,
    #[serde(rename = "Foreign_Born_Women_LF_Participation_%")]
    pub fb_women_participation: Option<f64>,
    #[serde(rename = "Native_Born_Women_LF_Participation_%")]
    pub nb_women_participation: Option<f64>,
    #[serde(rename = "Foreign_Born_Unemployment_%")]
    pub fb_unemployment: Option<f64>,
    #[serde(rename = "Native_Born_Unemployment_%")]
    pub nb_unemployment: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarningsRow {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Foreign_Born_Median_Weekly_Earnings_$")]
    pub fb_median: Option<f64>,
    #[serde(rename = "Native_Born_Median_Weekly_Earnings_$")]
    pub nb_median: Option<f64>,
    #[serde(rename = "Foreign_Born_as_%_of_Native_Born")]
    pub fb_pct_of_nb: Option<f64>,
    #[serde(rename = "Foreign_Born_Men_$")]
    pub fb_men: Option<f64>,
    #[serde(rename = "Native_Born_Men_$")]
    pub nb_men: Option<f64>,
    #[serde(rename = "Foreign_Born_Women_$")]
    pub fb_women: Option<f64>,
    #[serde(rename = "Native_Born_Women_$")]
    pub nb_women: Option<f64>,
    #[serde(rename = "Foreign_Born_Bachelor_Plus_$")]
    pub fb_bachelor_plus: Option<f64>,
    #[serde(rename = "Native_Born_Bachelor_Plus_$")]
    pub nb_bachelor_plus: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EducationRow {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Group")]
    pub group: Group,
    #[serde(rename = "Less_than_HS_%")]
    pub less_than_hs: f64,
    #[serde(rename = "HS_Graduate_No_College_%")]
    pub hs_graduate: f64,
    #[serde(rename = "Some_College_or_Associate_%")]
    pub some_college: f64,
    #[serde(rename = "Bachelor_Degree_or_Higher_%")]
    pub bachelor_plus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccupationRow {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Group")]
    pub group: Group,
    #[serde(rename = "Management_Professional_%")]
    pub management_professional: f64,
    #[serde(rename = "Service_Occupations_%")]
    pub service: f64,
    #[serde(rename = "Sales_Office_%")]
    pub sales_office: f64,
    #[serde(rename = "Natural_Resources_Construction_Maintenance_%")]
    pub natural_resources_construction: f64,
    #[serde(rename = "Production_Transportation_Material_Moving_%")]
    pub production_transportation: f64,
}

pub fn workforce_size() -> Vec<WorkforceSizeRow> {
    const ROWS: [(i32, f64, f64, f64); 10] = [
        (2015, 26.3, 16.5, 159.3),
        (2016, 27.0, 16.9, 159.9),
        (2017, 27.6, 17.1, 160.3),
        (2018, 28.0, 17.2, 162.1),
        (2019, 28.4, 17.4, 163.5),
        (2020, 27.6, 17.0, 160.7),
        (2021, 28.5, 17.4, 161.2),
        (2022, 29.8, 18.1, 163.5),
        (2023, 31.0, 18.6, 166.8),
        (2024, 31.8, 19.2, 165.6),
    ];
    ROWS.iter()
        .map(|&(year, workers, share, total)| WorkforceSizeRow {
            year,
            foreign_born_workers_millions: workers,
            foreign_born_share_pct: share,
            total_labor_force_millions: total,
        })
        .collect()
}

pub fn participation_unemployment() -> Vec<ParticipationRow> {
    type Cells = [Option<f64>; 8];
    let rows: [(i32, Cells); 10] = [
        (2015, [Some(65.2), Some(62.2), None, None, None, None, Some(3.9), Some(4.6)]),
        (2016, [Some(66.0), Some(62.3), None, None, None, None, Some(4.1), Some(4.4)]),
        (2017, [None, None, None, None, None, None, Some(3.8), Some(4.1)]),
        (2018, [None, None, None, None, None, None, Some(3.5), Some(3.5)]),
        (2019, [Some(65.7), Some(62.8), None, None, Some(53.2), None, Some(3.1), Some(3.8)]),
        (2020, [Some(64.5), Some(61.3), Some(76.6), None, Some(53.2), None, Some(8.4), Some(7.8)]),
        (2021, [Some(65.4), Some(61.6), None, None, None, None, Some(4.6), Some(4.9)]),
        (2022, [Some(66.1), Some(62.3), None, None, Some(55.0), None, Some(3.4), Some(3.6)]),
        (2023, [Some(66.5), Some(62.4), Some(77.4), Some(65.9), Some(56.1), Some(57.8), Some(3.6), Some(3.6)]),
        (2024, [Some(66.5), Some(61.7), Some(77.3), Some(65.9), Some(56.1), Some(57.8), Some(4.2), Some(4.0)]),
    ];
    rows.into_iter()
        .map(|(year, c)| ParticipationRow {
            year,
            fb_participation: c[0],
            nb_participation: c[1],
            fb_men_participation: c[2],
            nb_men_participation: c[3],
            fb_women_participation: c[4],
            nb_women_participation: c[5],
            fb_unemployment: c[6],
            nb_unemployment: c[7],
        })
        .collect()
}

pub fn median_weekly_earnings() -> Vec<EarningsRow> {
    type Cells = [Option<f64>; 9];
    const NONE: Cells = [None; 9];
    let rows: [(i32, Cells); 9] = [
        (2013, [None, None, Some(79.9), None, None, None, None, None, None]),
        (
            2016,
            [Some(715.0), Some(860.0), Some(83.1), Some(751.0), Some(951.0), Some(655.0), Some(762.0), None, None],
        ),
        (2018, [None, None, None, None, None, None, None, Some(1418.0), Some(1360.0)]),
        (2019, [None, None, None, None, None, None, None, Some(1418.0), Some(1360.0)]),
        (2020, NONE),
        (2021, NONE),
        (2022, NONE),
        (
            2023,
            [Some(1005.0), Some(1160.0), Some(86.6), Some(1051.0), Some(1238.0), Some(899.0), Some(1025.0), None, None],
        ),
        (
            2024,
            [
                Some(1089.0),
                Some(1252.0),
                Some(87.0),
                Some(1140.0),
                Some(1337.0),
                Some(983.0),
                Some(1154.0),
                Some(1738.0),
                Some(1679.0),
            ],
        ),
    ];
    rows.into_iter()
        .map(|(year, c)| EarningsRow {
            year,
            fb_median: c[0],
            nb_median: c[1],
            fb_pct_of_nb: c[2],
            fb_men: c[3],
            nb_men: c[4],
            fb_women: c[5],
            nb_women: c[6],
            fb_bachelor_plus: c[7],
            nb_bachelor_plus: c[8],
        })
        .collect()
}

pub fn educational_attainment() -> Vec<EducationRow> {
    use Group::{ForeignBorn, NativeBorn};
    let rows = [
        (2024, ForeignBorn, [18.1, 25.7, 15.0, 41.3]),
        (2024, NativeBorn, [3.2, 24.5, 27.0, 45.3]),
        (2023, ForeignBorn, [18.4, 25.9, 15.0, 40.7]),
        (2023, NativeBorn, [3.3, 24.7, 27.1, 44.9]),
        (2019, ForeignBorn, [19.8, 25.4, 15.7, 39.1]),
        (2019, NativeBorn, [3.8, 25.2, 27.8, 43.2]),
        (2015, ForeignBorn, [21.5, 24.8, 16.2, 37.5]),
        (2015, NativeBorn, [4.4, 26.1, 28.7, 40.8]),
    ];
    rows.into_iter()
        .map(|(year, group, c)| EducationRow {
            year,
            group,
            less_than_hs: c[0],
            hs_graduate: c[1],
            some_college: c[2],
            bachelor_plus: c[3],
        })
        .collect()
}

pub fn occupational_distribution() -> Vec<OccupationRow> {
    use Group::{ForeignBorn, NativeBorn};
    let rows = [
        (2019, ForeignBorn, [33.9, 22.5, 15.5, 13.4, 14.7]),
        (2019, NativeBorn, [42.2, 16.0, 21.4, 8.2, 11.2]),
        (2015, ForeignBorn, [32.1, 23.4, 15.1, 14.2, 15.2]),
        (2015, NativeBorn, [40.8, 16.8, 22.1, 8.7, 11.6]),
        (2024, ForeignBorn, [34.5, 21.8, 15.9, 13.1, 14.7]),
        (2024, NativeBorn, [43.1, 15.7, 20.8, 8.0, 11.4]),
    ];
    rows.into_iter()
        .map(|(year, group, c)| OccupationRow {
            year,
            group,
            management_professional: c[0],
            service: c[1],
            sales_office: c[2],
            natural_resources_construction: c[3],
            production_transportation: c[4],
        })
        .collect()
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to write row to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    info!(path = %path.display(), rows = rows.len(), "compiled dataset written");
    Ok(())
}

/// Write all five compiled datasets into `dir`. Returns the paths written.
pub fn write_compiled_datasets(dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let path = |name: &str| dir.join(name);
    let paths = vec![
        path(WORKFORCE_SIZE_FILE),
        path(PARTICIPATION_FILE),
        path(EARNINGS_FILE),
        path(EDUCATION_FILE),
        path(OCCUPATION_FILE),
    ];

    write_rows(&paths[0], &workforce_size())?;
    write_rows(&paths[1], &participation_unemployment())?;
    write_rows(&paths[2], &median_weekly_earnings())?;
    write_rows(&paths[3], &educational_attainment())?;
    write_rows(&paths[4], &occupational_distribution())?;

    Ok(paths)
}

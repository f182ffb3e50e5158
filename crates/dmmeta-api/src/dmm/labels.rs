//! Detail table label bindings.
//!
//! Detail pages render most fields as two-column rows whose first cell is a
//! Japanese label. Only the labels below are read.

use phf::phf_map;

/// The record field a table row populates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowField {
    Id,
    Series,
    Maker,
    Publisher,
    Tags,
    Actors,
    Score,
    Duration,
    Director,
    ReleaseDate,
}

/// Exact label text (including the full-width colon) to field.
pub static ROW_LABELS: phf::Map<&'static str, RowField> = phf_map! {
    "品番：" => RowField::Id,
    "シリーズ：" => RowField::Series,
    "メーカー：" => RowField::Maker,
    "レーベル：" => RowField::Publisher,
    "ジャンル：" => RowField::Tags,
    "名前：" => RowField::Actors,
    "平均評価：" => RowField::Score,
    "収録時間：" => RowField::Duration,
    "監督：" => RowField::Director,
    "配信開始日：" => RowField::ReleaseDate,
    "商品発売日：" => RowField::ReleaseDate,
    "発売日：" => RowField::ReleaseDate,
};

/// Look up a label cell's trimmed text.
pub fn field_for(label: &str) -> Option<RowField> {
    ROW_LABELS.get(label.trim()).copied()
}

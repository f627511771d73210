use crate::ir::Timestamp;
use crate::layout::{TimelineLayout, VirtualItem, group_overlapping};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub range_start: Timestamp,
    pub range_end: Timestamp,
    pub granularity: String,
    pub granularity_index: usize,
    pub content_width: f32,
    pub viewport_width: f32,
    pub height: f32,
    pub pan_offset: f32,
    pub tick_count: usize,
    /// Only the ticks on screen.
    pub ticks: Vec<TickDump>,
    pub points: Vec<PointDump>,
    pub cards: Vec<CardDump>,
    /// Ids of cards that share an overlap group, in x order.
    pub groups: Vec<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickDump {
    pub index: usize,
    pub time: Timestamp,
    pub x: f32,
    pub label: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointDump {
    pub id: String,
    pub x: f32,
    pub width: Option<f32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDump {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub hovered: bool,
    pub selected: bool,
}

impl LayoutDump {
    pub fn from_layout(layout: &TimelineLayout) -> Self {
        let ticks = layout
            .ticks
            .iter()
            .map(|tick| TickDump {
                index: tick.index,
                time: tick.time,
                x: tick.x as f32,
                label: tick.label.clone(),
            })
            .collect();

        let points = layout
            .points
            .iter()
            .map(|point| PointDump {
                id: point.id.clone(),
                x: point.x as f32,
                width: point.width.map(|width| width as f32),
            })
            .collect();

        let cards = layout
            .cards
            .iter()
            .map(|card| CardDump {
                id: card.id.clone(),
                x: card.x as f32,
                y: card.y as f32,
                width: card.width as f32,
                height: card.height as f32,
                hovered: card.hovered,
                selected: card.selected,
            })
            .collect();

        let rects: Vec<VirtualItem> = layout
            .cards
            .iter()
            .map(|card| VirtualItem::new(card.id.clone(), card.x, card.y, card.width, card.height))
            .collect();
        let groups = group_overlapping(&rects)
            .into_iter()
            .map(|group| group.into_iter().map(|item| item.key).collect())
            .collect();

        LayoutDump {
            range_start: layout.range.start,
            range_end: layout.range.end,
            granularity: layout.granularity.label(),
            granularity_index: layout.granularity_index,
            content_width: layout.content_width as f32,
            viewport_width: layout.viewport_width as f32,
            height: layout.height as f32,
            pan_offset: layout.pan_offset as f32,
            tick_count: layout.tick_count,
            ticks,
            points,
            cards,
            groups,
        }
    }
}

pub fn layout_dump_json(layout: &TimelineLayout) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&LayoutDump::from_layout(layout))?)
}

pub fn write_layout_dump(path: &Path, layout: &TimelineLayout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

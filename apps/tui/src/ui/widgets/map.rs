use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::text::Line as TextLine;
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine, Points};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;
use tvmap_core::{Coordinates, DerivedViews, MapMarker, RegionMap};

const CHINA_LONGITUDE: [f64; 2] = [73.0, 135.5];
const CHINA_LATITUDE: [f64; 2] = [17.5, 54.0];
const BAND_COLORS: [Color; 4] = [Color::Cyan, Color::Yellow, Color::LightRed, Color::Magenta];

/// Geographic window shown by the map canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapFrame {
    pub longitude: [f64; 2],
    pub latitude: [f64; 2],
}

impl Default for MapFrame {
    fn default() -> Self {
        Self {
            longitude: CHINA_LONGITUDE,
            latitude: CHINA_LATITUDE,
        }
    }
}

impl MapFrame {
    /// The loaded outline wins; without one the window follows the
    /// viewport centre, or shows the whole country.
    pub fn for_view(map: Option<&RegionMap>, views: Option<&DerivedViews>) -> Self {
        if let Some((min, max)) = map.and_then(RegionMap::bounds) {
            return Self {
                longitude: [min.longitude, max.longitude],
                latitude: [min.latitude, max.latitude],
            };
        }

        let Some(views) = views else {
            return Self::default();
        };

        if let Some(center) = views.viewport.center {
            let half_lon = (CHINA_LONGITUDE[1] - CHINA_LONGITUDE[0]) / (4.0 * views.viewport.zoom);
            let half_lat = (CHINA_LATITUDE[1] - CHINA_LATITUDE[0]) / (4.0 * views.viewport.zoom);
            return Self {
                longitude: [center.longitude - half_lon, center.longitude + half_lon],
                latitude: [center.latitude - half_lat, center.latitude + half_lat],
            };
        }

        Self::default()
    }

    /// Geographic position under a terminal cell of `area`, if inside it.
    pub fn position_at(&self, area: Rect, column: u16, row: u16) -> Option<Coordinates> {
        let inside = column >= area.x
            && column < area.x + area.width
            && row >= area.y
            && row < area.y + area.height;
        if !inside {
            return None;
        }

        let x = (f64::from(column - area.x) + 0.5) / f64::from(area.width);
        let y = (f64::from(row - area.y) + 0.5) / f64::from(area.height);
        Some(Coordinates::new(
            x.mul_add(self.longitude[1] - self.longitude[0], self.longitude[0]),
            (-y).mul_add(self.latitude[1] - self.latitude[0], self.latitude[1]),
        ))
    }

    /// Geographic size of one terminal cell of `area`.
    pub fn cell_size(&self, area: Rect) -> (f64, f64) {
        (
            (self.longitude[1] - self.longitude[0]) / f64::from(area.width.max(1)),
            (self.latitude[1] - self.latitude[0]) / f64::from(area.height.max(1)),
        )
    }
}

/// The marker drawn in the same cell as `position`, if any.
pub fn marker_near<'a>(
    markers: &'a [MapMarker],
    position: Coordinates,
    cell: (f64, f64),
) -> Option<&'a MapMarker> {
    markers.iter().find(|marker| {
        (marker.position.longitude - position.longitude).abs() <= cell.0 / 2.0
            && (marker.position.latitude - position.latitude).abs() <= cell.1 / 2.0
    })
}

const fn weight_band(weight: u32) -> usize {
    match weight {
        0..=9 => 0,
        10..=49 => 1,
        50..=199 => 2,
        _ => 3,
    }
}

/// Draws the outline of the current map level and one point per hotel,
/// coloured by the number of TVs installed. Returns the inner canvas area.
pub fn render_map(
    f: &mut Frame<'_>,
    area: Rect,
    map: Option<&RegionMap>,
    views: Option<&DerivedViews>,
    title: &str,
) -> Rect {
    let block = Block::default()
        .title(TextLine::from(format!(" {title} ")))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    let frame = MapFrame::for_view(map, views);
    let outlines = map.map(RegionMap::outlines).unwrap_or_default();

    let mut buckets: [Vec<(f64, f64)>; 4] = Default::default();
    for marker in views.map(|views| views.markers.as_slice()).unwrap_or_default() {
        let point = (marker.position.longitude, marker.position.latitude);
        buckets[weight_band(marker.weight)].push(point);
    }

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds(frame.longitude)
        .y_bounds(frame.latitude)
        .paint(|ctx| {
            for ring in &outlines {
                for segment in ring.windows(2) {
                    ctx.draw(&CanvasLine {
                        x1: segment[0].0,
                        y1: segment[0].1,
                        x2: segment[1].0,
                        y2: segment[1].1,
                        color: Color::DarkGray,
                    });
                }
            }
            ctx.layer();
            for (bucket, color) in buckets.iter().zip(BAND_COLORS) {
                ctx.draw(&Points {
                    coords: bucket,
                    color,
                });
            }
        });

    f.render_widget(canvas, area);
    inner
}

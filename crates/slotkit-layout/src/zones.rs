#![forbid(unsafe_code)]

//! Slot row zones.
//!
//! A row is laid out right-to-left from the container's right padding: the
//! last strength channel's group sits flush right, earlier channels follow
//! leftwards separated by `group_gap`. The toggle is pinned to the left
//! padding. The name zone takes whatever remains between them, so adding a
//! channel only ever shrinks the name.
//!
//! ```text
//! | margin | pad toggle pad | name ... | pad | < 1.00 > | gap | < 1.00 > | pad | margin |
//! ```

use slotkit_core::geometry::Rect;
use slotkit_core::record::{StrengthChannel, StrengthMode};

use crate::LayoutMetrics;

/// An interactive zone within a slot row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    Toggle,
    Name,
    Decrement(StrengthChannel),
    Number(StrengthChannel),
    Increment(StrengthChannel),
}

impl Zone {
    /// The channel a strength zone belongs to.
    pub fn channel(self) -> Option<StrengthChannel> {
        match self {
            Self::Decrement(ch) | Self::Number(ch) | Self::Increment(ch) => Some(ch),
            Self::Toggle | Self::Name => None,
        }
    }
}

/// Rectangles of one channel's arrows and value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrengthGroup {
    pub dec: Rect,
    pub number: Rect,
    pub inc: Rect,
}

impl StrengthGroup {
    /// Bounding rectangle of the whole group.
    pub fn bounds(&self) -> Rect {
        self.dec.union(&self.inc)
    }
}

/// Every zone of a slot row in widget-local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneMap {
    pub container: Rect,
    pub toggle: Rect,
    pub name: Rect,
    /// Strength groups, left to right.
    pub groups: Vec<(StrengthChannel, StrengthGroup)>,
}

impl ZoneMap {
    /// Group for `channel`, if that channel is laid out.
    pub fn group(&self, channel: StrengthChannel) -> Option<&StrengthGroup> {
        self.groups
            .iter()
            .find_map(|(ch, g)| (*ch == channel).then_some(g))
    }

    /// Resolve a widget-local point to a zone.
    pub fn hit(&self, x: f32, y: f32) -> Option<Zone> {
        if self.toggle.contains(x, y) {
            return Some(Zone::Toggle);
        }
        for (ch, group) in &self.groups {
            if group.dec.contains(x, y) {
                return Some(Zone::Decrement(*ch));
            }
            if group.number.contains(x, y) {
                return Some(Zone::Number(*ch));
            }
            if group.inc.contains(x, y) {
                return Some(Zone::Increment(*ch));
            }
        }
        if self.name.contains(x, y) {
            return Some(Zone::Name);
        }
        None
    }

    /// All zone rectangles, for overlap checks and debug overlays.
    pub fn rects(&self) -> Vec<(Zone, Rect)> {
        let mut out = vec![(Zone::Toggle, self.toggle), (Zone::Name, self.name)];
        for (ch, g) in &self.groups {
            out.push((Zone::Decrement(*ch), g.dec));
            out.push((Zone::Number(*ch), g.number));
            out.push((Zone::Increment(*ch), g.inc));
        }
        out
    }
}

/// Lay out one slot row of the given width.
pub fn zones_for(width: f32, mode: StrengthMode, metrics: &LayoutMetrics) -> ZoneMap {
    let h = metrics.row_height;
    let pad = metrics.inner_padding;
    let container = Rect::new(metrics.margin, 0.0, width - metrics.margin * 2.0, h);

    let toggle = Rect::new(container.left() + pad, 0.0, metrics.toggle_width, h);

    let channels = mode.channels();
    let mut groups = Vec::with_capacity(channels.len());
    let mut cursor = container.right() - pad;
    for &ch in channels.iter().rev() {
        let inc = Rect::from_span(cursor - metrics.arrow_width, cursor, 0.0, h);
        let number = Rect::from_span(inc.left() - metrics.number_width, inc.left(), 0.0, h);
        let dec = Rect::from_span(number.left() - metrics.arrow_width, number.left(), 0.0, h);
        groups.push((ch, StrengthGroup { dec, number, inc }));
        cursor = dec.left() - metrics.group_gap;
    }
    groups.reverse();

    let name_left = toggle.right() + pad;
    let name_right = groups
        .first()
        .map_or(container.right() - pad, |(_, g)| g.dec.left() - pad);
    let name = Rect::new(name_left, 0.0, (name_right - name_left).max(0.0), h);

    ZoneMap {
        container,
        toggle,
        name,
        groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P: StrengthChannel = StrengthChannel::Primary;
    const S: StrengthChannel = StrengthChannel::Secondary;

    #[test]
    fn single_mode_reference_layout() {
        let z = zones_for(300.0, StrengthMode::Single, &LayoutMetrics::default());
        assert_eq!(z.container, Rect::new(10.0, 0.0, 280.0, 20.0));
        assert_eq!(z.toggle, Rect::new(14.0, 0.0, 28.0, 20.0));
        let g = z.group(P).copied().unwrap_or_else(|| panic!("primary group"));
        assert_eq!(g.inc, Rect::new(277.0, 0.0, 9.0, 20.0));
        assert_eq!(g.number, Rect::new(245.0, 0.0, 32.0, 20.0));
        assert_eq!(g.dec, Rect::new(236.0, 0.0, 9.0, 20.0));
        assert_eq!(z.name, Rect::new(46.0, 0.0, 186.0, 20.0));
        assert!(z.group(S).is_none());
    }

    #[test]
    fn dual_mode_adds_group_to_the_left() {
        let m = LayoutMetrics::default();
        let single = zones_for(300.0, StrengthMode::Single, &m);
        let dual = zones_for(300.0, StrengthMode::Dual, &m);
        assert_eq!(dual.toggle, single.toggle);
        assert_eq!(dual.groups.len(), 2);
        assert_eq!(dual.groups[0].0, P);

        let s = dual.groups[1].1;
        assert_eq!(s.inc.x, 277.0);
        assert_eq!(s.number.x, 245.0);
        assert_eq!(s.dec.x, 236.0);

        let p = dual.groups[0].1;
        assert_eq!(p.inc.x, 221.0);
        assert_eq!(p.number.x, 189.0);
        assert_eq!(p.dec.x, 180.0);
        assert_eq!(dual.name, Rect::new(46.0, 0.0, 130.0, 20.0));
    }

    #[test]
    fn hit_resolves_each_zone() {
        let z = zones_for(300.0, StrengthMode::Dual, &LayoutMetrics::default());
        assert_eq!(z.hit(20.0, 10.0), Some(Zone::Toggle));
        assert_eq!(z.hit(100.0, 10.0), Some(Zone::Name));
        assert_eq!(z.hit(182.0, 10.0), Some(Zone::Decrement(P)));
        assert_eq!(z.hit(200.0, 10.0), Some(Zone::Number(P)));
        assert_eq!(z.hit(225.0, 10.0), Some(Zone::Increment(P)));
        assert_eq!(z.hit(260.0, 10.0), Some(Zone::Number(S)));
        // Gap between groups and the container padding are dead space.
        assert_eq!(z.hit(232.0, 10.0), None);
        assert_eq!(z.hit(288.0, 10.0), None);
        assert_eq!(z.hit(100.0, 25.0), None);
    }

    #[test]
    fn narrow_row_name_never_negative() {
        let z = zones_for(60.0, StrengthMode::Dual, &LayoutMetrics::default());
        assert_eq!(z.name.width, 0.0);
        assert_eq!(z.toggle.x, 14.0);
    }

    #[test]
    fn zone_channel() {
        assert_eq!(Zone::Number(S).channel(), Some(S));
        assert_eq!(Zone::Toggle.channel(), None);
    }
}

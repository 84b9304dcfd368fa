//! Stitching unordered segments into polylines.

use std::collections::{HashMap, VecDeque};

use kurbo::Point;

use super::marching::Segment;
use super::Loop;

type Key = (i64, i64);

fn quantize(p: Point, scale: f64) -> Key {
    ((p.x * scale).round() as i64, (p.y * scale).round() as i64)
}

/// Endpoint index: quantized coordinate -> segments touching it.
struct EndpointIndex {
    scale: f64,
    map: HashMap<Key, Vec<usize>>,
}

impl EndpointIndex {
    fn build(segments: &[Segment], scale: f64) -> Self {
        let mut map: HashMap<Key, Vec<usize>> = HashMap::with_capacity(segments.len() * 2);
        for (i, seg) in segments.iter().enumerate() {
            map.entry(quantize(seg.a, scale)).or_default().push(i);
            map.entry(quantize(seg.b, scale)).or_default().push(i);
        }
        Self { scale, map }
    }

    fn key(&self, p: Point) -> Key {
        quantize(p, self.scale)
    }

    /// Take an unused segment touching `p`; returns its far endpoint.
    fn take_next(&self, p: Point, segments: &[Segment], used: &mut [bool]) -> Option<Point> {
        let key = self.key(p);
        let candidates = self.map.get(&key)?;
        let &i = candidates.iter().find(|&&i| !used[i])?;
        used[i] = true;
        let seg = segments[i];
        Some(if self.key(seg.a) == key { seg.b } else { seg.a })
    }
}

/// Chain segments into loops. Each segment is visited once; each step is a hash lookup.
///
/// `scale` is the multiplier applied before rounding endpoints to hash keys.
pub fn stitch(segments: &[Segment], scale: f64) -> Vec<Loop> {
    let index = EndpointIndex::build(segments, scale);
    let mut used = vec![false; segments.len()];
    let mut loops = Vec::new();

    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;

        let seg = segments[start];
        let start_key = index.key(seg.a);
        let mut points: VecDeque<Point> = VecDeque::from([seg.a, seg.b]);
        let mut closed = false;

        // forward from b
        while let Some(back) = points.back().copied() {
            match index.take_next(back, segments, &mut used) {
                Some(next) if index.key(next) == start_key => {
                    closed = true;
                    break;
                }
                Some(next) => points.push_back(next),
                None => break,
            }
        }

        // open chain: extend backwards from a
        if !closed {
            while let Some(front) = points.front().copied() {
                match index.take_next(front, segments, &mut used) {
                    Some(next) => points.push_front(next),
                    None => break,
                }
            }
        }

        if points.len() >= 3 {
            loops.push(Loop {
                points: points.into(),
                closed,
            });
        }
    }

    loops
}

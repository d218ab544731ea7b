//! Segments and the subsectors that group them. A subsector does not own its
//! segments, it is a checked range in to the segment array of its tree.

use log::warn;
use wad::extended::GlSegment;
use wad::lumps::{VertexRef, WadSegment, WadSubSector};

use crate::error::LevelError;
use crate::vertex_pool::VertexPool;

/// Which side of its linedef a segment runs along
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Same direction as the linedef, facing its right side
    Right = 0,
    /// Opposite direction, facing the left side
    Left = 1,
}

impl Side {
    fn from_direction(segment: usize, direction: i16) -> Result<Self, LevelError> {
        match direction {
            0 => Ok(Side::Right),
            1 => Ok(Side::Left),
            _ => Err(LevelError::InvalidSegDirection { segment, direction }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub start_vertex: VertexRef,
    pub end_vertex: VertexRef,
    /// `None` for a segment a nodebuilder placed along a partition line
    pub linedef: Option<usize>,
    pub side: Side,
    /// The segment on the other side of the same edge, extended data only
    pub partner: Option<usize>,
}

impl Segment {
    pub(crate) fn from_classic(
        num: usize,
        seg: &WadSegment,
        vertexes: &VertexPool,
        linedef_count: usize,
    ) -> Result<Self, LevelError> {
        Self::checked(
            num,
            seg.start_vertex,
            seg.end_vertex,
            Some(seg.linedef),
            seg.direction,
            None,
            vertexes,
            linedef_count,
            usize::MAX,
        )
    }

    pub(crate) fn from_extended(
        num: usize,
        seg: &GlSegment,
        vertexes: &VertexPool,
        linedef_count: usize,
        segment_count: usize,
    ) -> Result<Self, LevelError> {
        Self::checked(
            num,
            seg.start_vertex,
            seg.end_vertex,
            seg.linedef,
            seg.direction,
            seg.partner,
            vertexes,
            linedef_count,
            segment_count,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn checked(
        num: usize,
        start_vertex: VertexRef,
        end_vertex: VertexRef,
        linedef: Option<u16>,
        direction: i16,
        partner: Option<u32>,
        vertexes: &VertexPool,
        linedef_count: usize,
        segment_count: usize,
    ) -> Result<Self, LevelError> {
        vertexes.resolve(start_vertex)?;
        vertexes.resolve(end_vertex)?;

        let linedef = linedef.map(|l| l as usize);
        if let Some(linedef) = linedef.filter(|l| *l >= linedef_count) {
            return Err(LevelError::LineDefOutOfRange {
                segment: num,
                linedef,
                len: linedef_count,
            });
        }
        let partner = partner.map(|p| p as usize);
        if let Some(partner) = partner.filter(|p| *p >= segment_count) {
            return Err(LevelError::PartnerOutOfRange {
                segment: num,
                partner,
                len: segment_count,
            });
        }

        Ok(Self {
            start_vertex,
            end_vertex,
            linedef,
            side: Side::from_direction(num, direction)?,
            partner,
        })
    }
}

/// A convex leaf region: `seg_count` segments starting at `start_seg`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubSector {
    pub start_seg: usize,
    pub seg_count: usize,
}

impl SubSector {
    /// The segments bounding this subsector. Empty if `segments` is not the
    /// array the subsector was assembled against.
    pub fn segments<'a>(&self, segments: &'a [Segment]) -> &'a [Segment] {
        segments
            .get(self.start_seg..self.start_seg.saturating_add(self.seg_count))
            .unwrap_or(&[])
    }
}

/// Check each subsector's range fits `segment_count`, is not empty, and does
/// not share segments with any other subsector
pub(crate) fn assemble_subsectors(
    level: &str,
    raw: &[WadSubSector],
    segment_count: usize,
) -> Result<Vec<SubSector>, LevelError> {
    let mut subsectors = Vec::with_capacity(raw.len());
    for (i, ss) in raw.iter().enumerate() {
        let start = ss.start_seg as usize;
        let count = ss.seg_count as usize;
        if count == 0 {
            return Err(LevelError::EmptySubSector { subsector: i });
        }
        if start
            .checked_add(count)
            .is_none_or(|end| end > segment_count)
        {
            return Err(LevelError::SegmentSliceOutOfRange {
                subsector: i,
                start,
                count,
                len: segment_count,
            });
        }
        subsectors.push(SubSector {
            start_seg: start,
            seg_count: count,
        });
    }

    let mut order: Vec<usize> = (0..subsectors.len()).collect();
    order.sort_unstable_by_key(|i| subsectors[*i].start_seg);
    for pair in order.windows(2) {
        let (a, b) = (subsectors[pair[0]], subsectors[pair[1]]);
        if a.start_seg + a.seg_count > b.start_seg {
            return Err(LevelError::OverlappingSubSectors {
                first: pair[0],
                second: pair[1],
            });
        }
    }
    let covered: usize = subsectors.iter().map(|s| s.seg_count).sum();
    if covered != segment_count {
        warn!(
            "{}: subsectors cover {} of {} segments",
            level, covered, segment_count
        );
    }

    Ok(subsectors)
}

#[cfg(test)]
mod tests {
    use wad::extended::GlSegment;
    use wad::lumps::{VertexRef, WadSegment, WadSubSector, WadVertex};

    use crate::error::LevelError;
    use crate::segments::{Segment, Side, SubSector, assemble_subsectors};
    use crate::vertex_pool::VertexPool;

    fn ss(seg_count: u32, start_seg: u32) -> WadSubSector {
        WadSubSector {
            seg_count,
            start_seg,
        }
    }

    #[test]
    fn subsector_views() {
        let subsectors = assemble_subsectors("T", &[ss(2, 0), ss(3, 2)], 5).unwrap();
        assert_eq!(
            subsectors,
            vec![
                SubSector {
                    start_seg: 0,
                    seg_count: 2
                },
                SubSector {
                    start_seg: 2,
                    seg_count: 3
                }
            ]
        );

        let pool = VertexPool::new(&[WadVertex::default()]);
        let segs: Vec<Segment> = (0..5)
            .map(|i| {
                let raw = WadSegment {
                    start_vertex: VertexRef::Base(0),
                    end_vertex: VertexRef::Base(0),
                    angle: 0,
                    linedef: i,
                    direction: 0,
                    offset: 0,
                };
                Segment::from_classic(i as usize, &raw, &pool, 5).unwrap()
            })
            .collect();
        let view = subsectors[1].segments(&segs);
        assert_eq!(view.len(), 3);
        assert_eq!(view[0].linedef, Some(2));
        assert_eq!(view[2].linedef, Some(4));
    }

    #[test]
    fn slice_past_end() {
        assert!(matches!(
            assemble_subsectors("T", &[ss(2, 0), ss(3, 3)], 5),
            Err(LevelError::SegmentSliceOutOfRange {
                subsector: 1,
                start: 3,
                count: 3,
                len: 5
            })
        ));
        assert!(matches!(
            assemble_subsectors("T", &[ss(u32::MAX, u32::MAX)], 5),
            Err(LevelError::SegmentSliceOutOfRange { .. })
        ));
    }

    #[test]
    fn empty_and_overlapping() {
        assert!(matches!(
            assemble_subsectors("T", &[ss(0, 0)], 5),
            Err(LevelError::EmptySubSector { subsector: 0 })
        ));
        assert!(matches!(
            assemble_subsectors("T", &[ss(2, 2), ss(3, 0)], 5),
            Err(LevelError::OverlappingSubSectors {
                first: 1,
                second: 0
            })
        ));
        // Gaps are allowed, only logged
        assert!(assemble_subsectors("T", &[ss(1, 0), ss(1, 4)], 5).is_ok());
    }

    #[test]
    fn segment_checks() {
        let pool = VertexPool::new(&[WadVertex::default(); 2]);
        let mut raw = WadSegment {
            start_vertex: VertexRef::Base(0),
            end_vertex: VertexRef::Base(1),
            angle: 0,
            linedef: 0,
            direction: 1,
            offset: 0,
        };
        assert_eq!(
            Segment::from_classic(0, &raw, &pool, 1).unwrap().side,
            Side::Left
        );

        raw.direction = 2;
        assert!(matches!(
            Segment::from_classic(7, &raw, &pool, 1),
            Err(LevelError::InvalidSegDirection {
                segment: 7,
                direction: 2
            })
        ));

        raw.direction = 0;
        raw.linedef = 1;
        assert!(matches!(
            Segment::from_classic(0, &raw, &pool, 1),
            Err(LevelError::LineDefOutOfRange {
                segment: 0,
                linedef: 1,
                len: 1
            })
        ));

        let gl = GlSegment {
            start_vertex: VertexRef::Extended(0),
            end_vertex: VertexRef::Base(1),
            linedef: None,
            direction: 0,
            partner: Some(1),
        };
        assert!(matches!(
            Segment::from_extended(0, &gl, &pool, 1, 2),
            Err(LevelError::VertexOutOfRange {
                reference: VertexRef::Extended(0),
                len: 0
            })
        ));
        let pool = pool.with_extended(&[Default::default()]);
        let seg = Segment::from_extended(0, &gl, &pool, 1, 2).unwrap();
        assert_eq!(seg.linedef, None);
        assert_eq!(seg.partner, Some(1));
        assert!(matches!(
            Segment::from_extended(0, &gl, &pool, 1, 1),
            Err(LevelError::PartnerOutOfRange { partner: 1, .. })
        ));
    }
}

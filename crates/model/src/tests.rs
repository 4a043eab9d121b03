use super::*;

type Layout4 = TileGridLayout<4>;

#[test]
fn channel_kind_default_fill_matches_transparency_convention() {
    assert_eq!(ChannelKind::Alpha.default_fill(), 0);
    assert_eq!(ChannelKind::Color.default_fill(), 255);
}

#[test]
fn empty_rect_is_contained_everywhere_but_contains_nothing() {
    let rect = Rect::new(3, 4, 5, 6);
    assert!(rect.contains(Rect::EMPTY));
    assert!(rect.contains(Rect::new(100, 100, 0, 7)));
    assert!(!Rect::EMPTY.contains(rect));
    assert!(Rect::new(-5, -5, 0, 0).is_empty());
}

#[test]
fn union_ignores_empty_operands() {
    let rect = Rect::new(-2, 3, 4, 1);
    assert_eq!(rect.union(Rect::EMPTY), Some(rect));
    assert_eq!(Rect::EMPTY.union(rect), Some(rect));
    assert_eq!(
        rect.union(Rect::new(5, -1, 2, 2)),
        Some(Rect::new(-2, -1, 9, 5))
    );
}

#[test]
fn intersection_of_disjoint_rects_is_empty() {
    let left = Rect::new(0, 0, 4, 4);
    let right = Rect::new(4, 0, 4, 4);
    assert!(left.intersection(right).is_empty());
    assert!(!left.intersects(right));
    assert_eq!(
        left.intersection(Rect::new(2, 2, 10, 10)),
        Rect::new(2, 2, 2, 2)
    );
}

#[test]
fn union_too_wide_for_u32_is_rejected() {
    let far_left = Rect::new(i32::MIN, 0, u32::MAX, 1);
    let far_right = Rect::new(i32::MAX, 0, u32::MAX, 1);
    assert_eq!(far_left.union(far_right), None);
}

#[test]
fn alignment_rounds_on_anchored_lattice() {
    assert_eq!(align_down(5, 0, 4), 4);
    assert_eq!(align_down(-1, 0, 4), -4);
    assert_eq!(align_down(5, 1, 4), 5);
    assert_eq!(align_down(4, 1, 4), 1);
    assert_eq!(align_up(5, 0, 4), 8);
    assert_eq!(align_up(8, 0, 4), 8);
    assert_eq!(align_up(-3, 0, 4), 0);
    assert_eq!(align_up(6, 1, 4), 9);
}

#[test]
fn covering_rounds_outward_to_tile_multiples() {
    let layout = Layout4::covering(0, 0, Rect::new(0, 0, 6, 6)).expect("covering");
    assert_eq!(layout.pixel_rect(), Rect::new(0, 0, 8, 8));
    assert_eq!((layout.tiles_per_row(), layout.tiles_per_column()), (2, 2));

    let layout = Layout4::covering(0, 0, Rect::new(-1, 3, 2, 2)).expect("covering");
    assert_eq!(layout.pixel_rect(), Rect::new(-4, 0, 8, 8));
}

#[test]
fn covering_keeps_lattice_of_translated_anchor() {
    let layout = Layout4::covering(1, 2, Rect::new(0, 0, 3, 3)).expect("covering");
    assert_eq!(layout.origin(), (-3, -2));
    assert_eq!(layout.pixel_rect(), Rect::new(-3, -2, 8, 8));
}

#[test]
fn locate_maps_pixels_to_row_major_slots_and_offsets() {
    let layout = Layout4::new(-4, -4, 3, 2).expect("layout");
    assert_eq!(layout.locate(-4, -4), Some((0, 0)));
    assert_eq!(layout.locate(-1, -4), Some((0, 3)));
    assert_eq!(layout.locate(0, 0), Some((4, 0)));
    assert_eq!(layout.locate(7, 3), Some((5, 15)));
    assert_eq!(layout.locate(8, 0), None);
    assert_eq!(layout.locate(-5, 0), None);
    assert_eq!(layout.locate(0, 4), None);
}

#[test]
fn tile_index_and_pos_are_inverse() {
    let layout = Layout4::new(0, 0, 3, 2).expect("layout");
    for index in 0..layout.max_tiles() {
        let pos = layout.tile_pos(index).expect("tile pos");
        assert_eq!(layout.tile_index(pos), Ok(index));
    }
    assert_eq!(
        layout.tile_pos(6),
        Err(GridLayoutError::TileIndexOutOfBounds)
    );
    assert_eq!(
        layout.tile_index(TilePos { x: 3, y: 0 }),
        Err(GridLayoutError::TileIndexOutOfBounds)
    );
}

#[test]
fn tile_rect_is_offset_from_grid_origin() {
    let layout = Layout4::new(10, 20, 3, 2).expect("layout");
    assert_eq!(layout.tile_rect(0), Ok(Rect::new(10, 20, 4, 4)));
    assert_eq!(layout.tile_rect(4), Ok(Rect::new(14, 24, 4, 4)));
}

#[test]
fn tile_span_includes_partial_tiles_and_clips_to_grid() {
    let layout = Layout4::new(0, 0, 4, 4).expect("layout");
    let span = layout.tile_span(Rect::new(3, 5, 2, 100)).expect("span");
    assert_eq!(span.first, TilePos { x: 0, y: 1 });
    assert_eq!(span.last, TilePos { x: 1, y: 3 });
    assert_eq!(span.iter().count(), 6);
    assert_eq!(layout.tile_span(Rect::new(16, 0, 4, 4)), None);
}

#[test]
fn offset_within_requires_containment_on_same_lattice() {
    let inner = Layout4::new(4, 8, 1, 1).expect("inner");
    let outer = Layout4::new(0, 0, 4, 4).expect("outer");
    assert_eq!(inner.offset_within(&outer), Some(TilePos { x: 1, y: 2 }));

    let misaligned = Layout4::new(1, 0, 4, 4).expect("misaligned");
    assert_eq!(Layout4::new(3, 0, 1, 1).expect("inner").offset_within(&misaligned), None);
    assert_eq!(outer.offset_within(&inner), None);
}

#[test]
fn new_rejects_grids_beyond_coordinate_range() {
    assert_eq!(
        Layout4::new(i32::MAX - 3, 0, 2, 1),
        Err(GridLayoutError::GridTooLarge)
    );
    assert!(Layout4::new(i32::MAX - 3, 0, 1, 1).is_ok());
    assert_eq!(Layout4::new(5, 5, 0, 3), Ok(Layout4::EMPTY));
}

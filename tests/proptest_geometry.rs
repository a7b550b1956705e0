use dimfuse::ir::BoundingBox;
use proptest::prelude::*;

mod proptest_helpers;

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn iou_with_itself_is_one(bbox in proptest_helpers::arb_bbox()) {
        prop_assert!((bbox.iou(&bbox) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn iou_is_symmetric_and_bounded(
        a in proptest_helpers::arb_bbox(),
        b in proptest_helpers::arb_bbox(),
    ) {
        let ab = a.iou(&b);
        prop_assert_eq!(ab, b.iou(&a));
        prop_assert!((0.0..=1.0).contains(&ab));
    }

    #[test]
    fn iou_of_disjoint_boxes_is_zero(
        a in proptest_helpers::arb_bbox(),
        gap in 0.0f64..500.0,
    ) {
        let shifted = a.translated(a.width() + gap, 0.0);
        prop_assert_eq!(a.iou(&shifted), 0.0);
    }

    #[test]
    fn translation_preserves_size_and_leaves_original(
        a in proptest_helpers::arb_bbox(),
        dx in -100.0f64..100.0,
        dy in -100.0f64..100.0,
    ) {
        let copy = a;
        let moved = a.translated(dx, dy);
        prop_assert!((moved.width() - a.width()).abs() < 1e-9);
        prop_assert!((moved.height() - a.height()).abs() < 1e-9);
        prop_assert_eq!(a, copy);
    }

    #[test]
    fn degenerate_boxes_never_overlap(x in 0.0f64..100.0, y in 0.0f64..100.0) {
        let point = BoundingBox::new(x, y, x, y);
        prop_assert_eq!(point.iou(&point), 0.0);
    }
}

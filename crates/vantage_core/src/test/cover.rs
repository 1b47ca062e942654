#[cfg(test)]
mod test_cover {
    use crate::prelude::*;
    use crate::test::util::*;

    #[test]
    fn straight_line_intermediate_cells() {
        assert_eq!(
            cells_between(c!(0, 0), c!(4, 0)),
            vec![c!(1, 0), c!(2, 0), c!(3, 0)]
        );
        assert_eq!(
            cells_between(c!(0, 0), c!(0, 3)),
            vec![c!(0, 1), c!(0, 2)]
        );
    }

    #[test]
    fn diagonal_line_is_deterministic() {
        let forward = cells_between(c!(0, 0), c!(3, 2));
        assert_eq!(forward, cells_between(c!(0, 0), c!(3, 2)));
        for cell in &forward {
            assert_ne!(*cell, c!(0, 0));
            assert_ne!(*cell, c!(3, 2));
        }
        assert_eq!(forward.len(), 2);
    }

    #[test]
    fn endpoints_are_never_included() {
        assert!(cells_between(c!(2, 2), c!(2, 2)).is_empty());
        assert!(cells_between(c!(2, 2), c!(3, 2)).is_empty());

        let walked = cells_between(c!(1, 1), c!(6, 4));
        assert!(!walked.contains(&c!(1, 1)));
        assert!(!walked.contains(&c!(6, 4)));
    }

    #[test]
    fn obstacles_at_endpoints_contribute_nothing() {
        let (mut field, _) = test_field(Rules::default(), vec![]);
        field.spawn_obstacle(ObstacleKind::HighWall, c!(0, 0));
        field.spawn_obstacle(ObstacleKind::HighWall, c!(4, 0));

        assert_eq!(field.cover_between(c!(0, 0), c!(4, 0)), 0.0);
    }

    #[test]
    fn maximum_cover_wins() {
        let (mut field, _) = test_field(Rules::default(), vec![]);
        field.spawn_obstacle(ObstacleKind::Terrain, c!(1, 0));
        field.spawn_obstacle(ObstacleKind::LowCover, c!(2, 0));
        field.spawn_obstacle(ObstacleKind::Terrain, c!(3, 0));

        assert_eq!(field.cover_between(c!(0, 0), c!(4, 0)), 0.5);
    }

    #[test]
    fn disabled_partial_cover_yields_zero() {
        let rules = Rules {
            partial_cover: false,
            ..Default::default()
        };
        let (mut field, _) = test_field(rules, vec![]);
        field.spawn_obstacle(ObstacleKind::LowCover, c!(2, 0));

        assert_eq!(field.cover_between(c!(0, 0), c!(4, 0)), 0.0);
    }

    #[test]
    fn missing_grid_context_yields_zero() {
        let mut field = gridless_field(Rules::default());
        field.spawn_obstacle(ObstacleKind::LowCover, c!(2, 0));
        assert_eq!(field.cover_between(c!(0, 0), c!(4, 0)), 0.0);
    }

    #[test]
    fn empty_line_yields_zero() {
        let (field, _) = test_field(Rules::default(), vec![]);
        assert_eq!(field.cover_between(c!(0, 0), c!(4, 0)), 0.0);
    }
}

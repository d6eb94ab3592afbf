#[cfg(test)]
mod tests {
    use glam::DVec2;

    use crate::catalog;
    use crate::commands::PlayerCommand;
    use crate::constants::*;
    use crate::enums::*;
    use crate::types::Rect;

    fn castle_footprint() -> Rect {
        Rect::new(
            DVec2::new(CASTLE_CENTER_X, CASTLE_CENTER_Y),
            DVec2::new(CASTLE_WIDTH, CASTLE_HEIGHT),
        )
    }

    #[test]
    fn test_castle_footprint_edges() {
        let rect = castle_footprint();
        assert_eq!(rect.left(), 225.0);
        assert_eq!(rect.right(), 575.0);
        assert_eq!(rect.top(), 450.0);
        assert_eq!(rect.bottom(), 600.0);
    }

    #[test]
    fn test_boundary_threshold_is_inclusive() {
        let rect = castle_footprint();
        let t = CASTLE_BOUNDARY_THRESHOLD;
        // Exactly at the threshold counts as arrived.
        assert!(rect.on_boundary(DVec2::new(400.0, rect.top() - t), t));
        // Just beyond does not.
        assert!(!rect.on_boundary(DVec2::new(400.0, rect.top() - t - 0.001), t));
        // A point inside the footprint always counts.
        assert!(rect.on_boundary(DVec2::new(400.0, 525.0), t));
    }

    #[test]
    fn test_boss_rotation_covers_all_kinds() {
        // Waves 10, 20, 30, 40 map onto the four boss kinds in order.
        let rotation = [BossKind::Force, BossKind::Spirit, BossKind::Magic, BossKind::Void];
        for (i, kind) in rotation.iter().enumerate() {
            let wave = BOSS_WAVE_PERIOD * (i as u32 + 1);
            let index = ((wave / BOSS_WAVE_PERIOD - 1) % 4) as usize;
            assert_eq!(rotation[index], *kind);
        }
        // Wave 50 wraps back to Force.
        assert_eq!(rotation[((50 / BOSS_WAVE_PERIOD - 1) % 4) as usize], BossKind::Force);
    }

    #[test]
    fn test_only_spirit_boss_has_active_ability() {
        for kind in [BossKind::Force, BossKind::Spirit, BossKind::Magic, BossKind::Void] {
            let spec = catalog::boss_spec(kind);
            if kind == BossKind::Spirit {
                assert_eq!(spec.ability, BossAbility::Heal);
            } else {
                assert_ne!(spec.ability, BossAbility::Heal);
            }
        }
    }

    #[test]
    fn test_environment_deaths_drop_no_loot() {
        assert!(DeathCause::TowerDamage.awards_loot());
        assert!(DeathCause::WaveTimeout.awards_loot());
        for cause in [
            DeathCause::OutOfBounds,
            DeathCause::Stuck,
            DeathCause::NumericFault,
        ] {
            assert!(!cause.awards_loot());
        }
    }

    #[test]
    fn test_command_serde_tagging() {
        let cmd = PlayerCommand::UpgradeTower {
            tower_number: 3,
            track: UpgradeTrack::Range,
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("\"type\":\"UpgradeTower\""));
        let back: PlayerCommand = serde_json::from_str(&json).unwrap();
        match back {
            PlayerCommand::UpgradeTower { tower_number, track } => {
                assert_eq!(tower_number, 3);
                assert_eq!(track, UpgradeTrack::Range);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}

//! Property tests for dense sibling positions and board rosters

use proptest::prelude::*;
use uuid::Uuid;

use taskboard::backend::ordering::sequence::{
    insert_into, move_within, next_position, remove_from, reorder, sort_by_position, verify_dense,
};
use taskboard::shared::{Board, Column, Task, Visibility};

fn columns(count: usize) -> (Uuid, Vec<Column>) {
    let board_id = Uuid::new_v4();
    let mut siblings = Vec::new();
    for index in 0..count {
        let mut column = Column::new(board_id, format!("C{}", index));
        column.position = next_position(&siblings);
        siblings.push(column);
    }
    (board_id, siblings)
}

#[derive(Debug, Clone)]
enum Op {
    Move { index: usize, position: i32 },
    Remove { index: usize },
    Insert { position: i32 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..16, 1i32..20).prop_map(|(index, position)| Op::Move { index, position }),
        (0usize..16).prop_map(|index| Op::Remove { index }),
        (1i32..20).prop_map(|position| Op::Insert { position }),
    ]
}

proptest! {
    #[test]
    fn prop_operations_keep_positions_dense(
        initial in 0usize..10,
        ops in prop::collection::vec(op_strategy(), 0..40),
    ) {
        let (board_id, mut siblings) = columns(initial);

        for op in ops {
            match op {
                Op::Move { index, position } => {
                    if siblings.is_empty() {
                        continue;
                    }
                    let id = siblings[index % siblings.len()].id;
                    move_within(&mut siblings, id, position).expect("move");
                    sort_by_position(&mut siblings);
                }
                Op::Remove { index } => {
                    if siblings.is_empty() {
                        continue;
                    }
                    let id = siblings[index % siblings.len()].id;
                    let before = siblings.len();
                    remove_from(&mut siblings, id).expect("remove");
                    prop_assert_eq!(siblings.len(), before - 1);
                }
                Op::Insert { position } => {
                    let column = Column::new(board_id, "new".to_string());
                    let (taken, _) = insert_into(&mut siblings, board_id, column, position).expect("insert");
                    prop_assert!(taken >= 1 && taken as usize <= siblings.len());
                }
            }
            prop_assert!(verify_dense(&siblings).is_ok());
        }
    }

    #[test]
    fn prop_move_preserves_relative_order_of_others(
        count in 2usize..12,
        from in 0usize..12,
        to in 1i32..14,
    ) {
        let (_, mut siblings) = columns(count);
        let moved = siblings[from % count].id;
        let others_before: Vec<Uuid> = siblings.iter().map(|c| c.id).filter(|id| *id != moved).collect();

        move_within(&mut siblings, moved, to).expect("move");
        sort_by_position(&mut siblings);

        let others_after: Vec<Uuid> = siblings.iter().map(|c| c.id).filter(|id| *id != moved).collect();
        prop_assert_eq!(others_before, others_after);
        let expected = to.min(count as i32);
        prop_assert_eq!(siblings.iter().find(|c| c.id == moved).map(|c| c.position), Some(expected));
    }

    #[test]
    fn prop_cross_parent_move_keeps_both_sides_dense(
        source_len in 1usize..8,
        target_len in 0usize..8,
        pick in 0usize..8,
        position in 1i32..12,
    ) {
        let source_column = Uuid::new_v4();
        let target_column = Uuid::new_v4();
        let assignee = Uuid::new_v4();
        let build = |column_id: Uuid, len: usize| {
            let mut tasks: Vec<Task> = Vec::new();
            for index in 0..len {
                let mut task = Task::new(column_id, format!("T{}", index), assignee);
                task.position = next_position(&tasks);
                tasks.push(task);
            }
            tasks
        };
        let mut source = build(source_column, source_len);
        let mut target = build(target_column, target_len);

        let id = source[pick % source_len].id;
        let (task, _) = remove_from(&mut source, id).expect("remove");
        insert_into(&mut target, target_column, task, position).expect("insert");

        prop_assert!(verify_dense(&source).is_ok());
        prop_assert!(verify_dense(&target).is_ok());
        prop_assert_eq!(source.len() + target.len(), source_len + target_len);
        prop_assert!(target.iter().all(|t| t.column_id == target_column));
    }

    #[test]
    fn prop_reorder_by_permutation_is_dense(count in 1usize..10, seed in any::<u64>()) {
        let (_, mut siblings) = columns(count);
        let mut order: Vec<Uuid> = siblings.iter().map(|c| c.id).collect();
        // deterministic shuffle
        let mut state = seed;
        for i in (1..order.len()).rev() {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let j = (state >> 33) as usize % (i + 1);
            order.swap(i, j);
        }

        reorder(&mut siblings, &order).expect("reorder");
        prop_assert!(verify_dense(&siblings).is_ok());
        let after: Vec<Uuid> = siblings.iter().map(|c| c.id).collect();
        prop_assert_eq!(after, order);
    }

    #[test]
    fn prop_roster_stays_consistent(ops in prop::collection::vec((0u8..4, 0usize..5), 0..40)) {
        let creator = Uuid::new_v4();
        let users: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).chain([creator]).collect();
        let mut board = Board::new("Roster".to_string(), None, Visibility::Workspace, creator);

        for (kind, who) in ops {
            let user = users[who];
            match kind {
                0 => { board.add_member(user); }
                1 => { board.remove_member(user); }
                2 => { board.grant_admin(user); }
                _ => { board.revoke_admin(user); }
            }
            prop_assert!(board.roster_is_consistent());
            prop_assert!(board.is_member(creator) && board.is_admin(creator));
        }
    }
}

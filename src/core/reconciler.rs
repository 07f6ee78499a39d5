//! # List Reconciler
//!
//! Turns an old and a new ordered list of users into the edits that
//! transform one into the other. Pure and synchronous: no I/O, no caching,
//! inputs are never mutated.
//!
//! Items are matched by `id`; a matched pair is re-rendered only when the two
//! values differ. Edits come out in four groups and must be applied in order,
//! each position referring to the list as it stands at that point:
//!
//! ```text
//! 1. Remove  unmatched old items, highest position first
//! 2. Move    matched items that are out of order (fewest moves possible)
//! 3. Insert  unmatched new items, lowest position first
//! 4. Update  matched items whose content changed, at their final position
//! ```
//!
//! When an id occurs more than once, the k-th occurrence in `old` is matched
//! with the k-th occurrence in `new`; leftovers are removed or inserted.

use std::collections::HashMap;
use std::fmt;

use crate::core::user::User;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Remove { position: usize, id: u64 },
    /// Take the item at `from` out, then put it back at `to`.
    Move { from: usize, to: usize },
    Insert { position: usize, user: User },
    Update { position: usize, user: User },
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edit::Remove { position, id } => write!(f, "remove  #{position} (id {id})"),
            Edit::Move { from, to } => write!(f, "move    #{from} -> #{to}"),
            Edit::Insert { position, user } => {
                write!(f, "insert  #{position} {} (id {})", user.display_name(), user.id)
            }
            Edit::Update { position, user } => {
                write!(f, "update  #{position} {} (id {})", user.display_name(), user.id)
            }
        }
    }
}

/// Computes the edits that turn `old` into `new`.
pub fn diff(old: &[User], new: &[User]) -> Vec<Edit> {
    let matches = match_by_id(old, new);
    let mut edits = Vec::new();

    // Removals, back to front so earlier positions stay valid.
    for (position, user) in old.iter().enumerate().rev() {
        if matches[position].is_none() {
            edits.push(Edit::Remove {
                position,
                id: user.id,
            });
        }
    }

    // Survivors, tagged with the position they must reach in `new`.
    let mut working: Vec<usize> = matches.iter().filter_map(|m| *m).collect();
    let mut ordered = working.clone();
    ordered.sort_unstable();

    let stable = longest_increasing_run(&working);
    let mut movers: Vec<usize> = working
        .iter()
        .enumerate()
        .filter(|(i, _)| !stable[*i])
        .map(|(_, &target)| target)
        .collect();
    movers.sort_unstable();

    // Place each mover right after the item that precedes it in `new`.
    // Processing in target order keeps every placed pair adjacent.
    for target in movers {
        let Some(from) = working.iter().position(|&t| t == target) else {
            continue;
        };
        working.remove(from);
        let rank = ordered.binary_search(&target).unwrap_or_default();
        let to = match rank.checked_sub(1) {
            Some(prev) => {
                let anchor = ordered[prev];
                working
                    .iter()
                    .position(|&t| t == anchor)
                    .map_or(0, |p| p + 1)
            }
            None => 0,
        };
        working.insert(to, target);
        if from != to {
            edits.push(Edit::Move { from, to });
        }
    }

    let mut matched_new = vec![false; new.len()];
    for &target in &ordered {
        matched_new[target] = true;
    }

    for (position, user) in new.iter().enumerate() {
        if !matched_new[position] {
            edits.push(Edit::Insert {
                position,
                user: user.clone(),
            });
        }
    }

    let mut changed: Vec<usize> = matches
        .iter()
        .enumerate()
        .filter_map(|(from, target)| target.filter(|&to| old[from] != new[to]))
        .collect();
    changed.sort_unstable();
    edits.extend(changed.into_iter().map(|position| Edit::Update {
        position,
        user: new[position].clone(),
    }));

    edits
}

/// For each old position, the new position of the item with the same id.
fn match_by_id(old: &[User], new: &[User]) -> Vec<Option<usize>> {
    let mut slots: HashMap<u64, Vec<usize>> = HashMap::new();
    for (position, user) in new.iter().enumerate().rev() {
        slots.entry(user.id).or_default().push(position);
    }

    // Each slot list is in descending order, so `pop` yields occurrences front to back.
    old.iter()
        .map(|user| slots.get_mut(&user.id).and_then(Vec::pop))
        .collect()
}

/// Marks the elements of one longest strictly increasing subsequence.
/// Ties resolve to the earliest-ending candidate, so the result is deterministic.
fn longest_increasing_run(values: &[usize]) -> Vec<bool> {
    // tails[k] = index into `values` of the smallest tail of a run of length k + 1.
    let mut tails: Vec<usize> = Vec::new();
    let mut previous: Vec<Option<usize>> = vec![None; values.len()];

    for (i, &value) in values.iter().enumerate() {
        let k = tails.partition_point(|&t| values[t] < value);
        previous[i] = k.checked_sub(1).map(|p| tails[p]);
        if k == tails.len() {
            tails.push(i);
        } else {
            tails[k] = i;
        }
    }

    let mut keep = vec![false; values.len()];
    let mut cursor = tails.last().copied();
    while let Some(i) = cursor {
        keep[i] = true;
        cursor = previous[i];
    }
    keep
}

/// An edit referred to a position the list does not have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyError {
    pub edit: Edit,
    pub len: usize,
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot apply `{}` to a list of {} users", self.edit, self.len)
    }
}

impl std::error::Error for ApplyError {}

/// Replays `edits` onto `users` in order.
///
/// Stops at the first out-of-range edit; edits before it stay applied.
pub fn apply(users: &mut Vec<User>, edits: &[Edit]) -> Result<(), ApplyError> {
    for edit in edits {
        let out_of_range = || ApplyError {
            edit: edit.clone(),
            len: users.len(),
        };
        match edit {
            Edit::Remove { position, .. } => {
                if *position >= users.len() {
                    return Err(out_of_range());
                }
                users.remove(*position);
            }
            Edit::Move { from, to } => {
                if *from >= users.len() || *to >= users.len() {
                    return Err(out_of_range());
                }
                let user = users.remove(*from);
                users.insert(*to, user);
            }
            Edit::Insert { position, user } => {
                if *position > users.len() {
                    return Err(out_of_range());
                }
                users.insert(*position, user.clone());
            }
            Edit::Update { position, user } => {
                let len = users.len();
                let Some(slot) = users.get_mut(*position) else {
                    return Err(ApplyError {
                        edit: edit.clone(),
                        len,
                    });
                };
                *slot = user.clone();
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_users, user};

    fn assert_replays(old: &[User], new: &[User]) -> Vec<Edit> {
        let edits = diff(old, new);
        let mut replayed = old.to_vec();
        apply(&mut replayed, &edits).unwrap();
        assert_eq!(replayed, new, "edits {edits:?} did not replay");
        edits
    }

    fn users(ids: &[u64]) -> Vec<User> {
        ids.iter().map(|&id| user(id, &format!("U{id}"))).collect()
    }

    fn move_count(edits: &[Edit]) -> usize {
        edits.iter().filter(|e| matches!(e, Edit::Move { .. })).count()
    }

    #[test]
    fn test_identical_lists_produce_no_edits() {
        assert!(diff(&sample_users(), &sample_users()).is_empty());
        assert!(diff(&[], &[]).is_empty());
    }

    #[test]
    fn test_remove_one_insert_one() {
        let old = vec![user(1, "A"), user(2, "B")];
        let new = vec![user(2, "B"), user(3, "C")];
        let edits = assert_replays(&old, &new);
        assert_eq!(
            edits,
            vec![
                Edit::Remove { position: 0, id: 1 },
                Edit::Insert {
                    position: 1,
                    user: user(3, "C")
                },
            ]
        );
    }

    #[test]
    fn test_from_and_to_empty() {
        let edits = assert_replays(&[], &sample_users());
        assert_eq!(edits.len(), 3);
        assert!(edits.iter().all(|e| matches!(e, Edit::Insert { .. })));

        let edits = assert_replays(&sample_users(), &[]);
        assert_eq!(
            edits,
            vec![
                Edit::Remove { position: 2, id: 3 },
                Edit::Remove { position: 1, id: 2 },
                Edit::Remove { position: 0, id: 1 },
            ]
        );
    }

    #[test]
    fn test_changed_content_is_an_update() {
        let old = sample_users();
        let mut new = sample_users();
        new[1] = new[1].clone().with_email("brian@work.example");
        let edits = assert_replays(&old, &new);
        assert_eq!(
            edits,
            vec![Edit::Update {
                position: 1,
                user: new[1].clone()
            }]
        );
    }

    #[test]
    fn test_single_displaced_item_is_one_move() {
        // Moving the head to the tail: one move, not two.
        let edits = assert_replays(&users(&[3, 1, 2]), &users(&[1, 2, 3]));
        assert_eq!(edits, vec![Edit::Move { from: 0, to: 2 }]);

        let edits = assert_replays(&users(&[1, 2, 3, 4, 5]), &users(&[1, 5, 2, 3, 4]));
        assert_eq!(move_count(&edits), 1);
    }

    #[test]
    fn test_reversal_uses_minimal_moves() {
        let edits = assert_replays(&users(&[1, 2, 3, 4, 5]), &users(&[5, 4, 3, 2, 1]));
        assert_eq!(move_count(&edits), 4);
        assert_eq!(edits.len(), 4);
    }

    #[test]
    fn test_moves_with_inserts_removals_and_updates() {
        let old = users(&[1, 2, 3, 4, 5, 6]);
        let mut new = users(&[7, 6, 2, 8, 4, 1]);
        new[2] = new[2].clone().with_name("Two");
        let edits = assert_replays(&old, &new);
        assert!(edits.iter().any(|e| matches!(e, Edit::Update { position: 2, .. })));
    }

    #[test]
    fn test_duplicate_ids_match_in_order() {
        let old = vec![user(1, "A"), user(1, "A2"), user(2, "B")];
        let new = vec![user(1, "A"), user(2, "B"), user(1, "A3"), user(1, "A4")];
        assert_replays(&old, &new);
        assert_replays(&new, &old);
    }

    #[test]
    fn test_diff_is_deterministic() {
        let old = users(&[4, 9, 1, 7, 3]);
        let new = users(&[3, 1, 8, 9, 4]);
        assert_eq!(diff(&old, &new), diff(&old, &new));
    }

    #[test]
    fn test_many_permutations_replay() {
        // Rotations and interleavings of a small id set, plus churn.
        let base: Vec<u64> = (1..=7).collect();
        for shift in 0..base.len() {
            let mut rotated = base.clone();
            rotated.rotate_left(shift);
            assert_replays(&users(&base), &users(&rotated));

            let churned: Vec<u64> = rotated
                .iter()
                .map(|&id| if id % 3 == 0 { id + 100 } else { id })
                .collect();
            assert_replays(&users(&base), &users(&churned));
            assert_replays(&users(&churned), &users(&rotated[..shift]));
        }
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let old = users(&[1, 2, 3]);
        let new = users(&[3, 2]);
        let old_copy = old.clone();
        let new_copy = new.clone();
        let _ = diff(&old, &new);
        assert_eq!(old, old_copy);
        assert_eq!(new, new_copy);
    }

    #[test]
    fn test_longest_increasing_run() {
        assert_eq!(
            longest_increasing_run(&[2, 0, 1]),
            vec![false, true, true]
        );
        assert_eq!(longest_increasing_run(&[]), Vec::<bool>::new());
        assert_eq!(
            longest_increasing_run(&[0, 1, 2]),
            vec![true, true, true]
        );
    }

    #[test]
    fn test_apply_rejects_out_of_range() {
        let mut list = users(&[1]);
        let err = apply(&mut list, &[Edit::Remove { position: 3, id: 9 }]).unwrap_err();
        assert_eq!(err.len, 1);
        assert!(err.to_string().contains("list of 1 users"));
    }
}

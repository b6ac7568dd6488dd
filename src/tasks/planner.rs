//! Quick planner: split a free-text goal into task titles.

/// Most tasks a comma-separated goal can expand to.
const MAX_PARTS: usize = 5;

/// Goals longer than this many words get a generic outline.
const LONG_GOAL_WORDS: usize = 12;

/// Split a goal into task titles.
///
/// - contains commas: the first five non-empty trimmed parts
/// - more than twelve words: a three-step outline
/// - otherwise: the goal itself
pub fn split_goal_to_tasks(goal: &str) -> Vec<String> {
    let clean = goal.trim();
    if clean.is_empty() {
        return Vec::new();
    }

    if clean.contains(',') {
        return clean
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .take(MAX_PARTS)
            .map(String::from)
            .collect();
    }

    if clean.split_whitespace().count() > LONG_GOAL_WORDS {
        return ["Outline the goal", "List requirements", "Draft first version"]
            .into_iter()
            .map(String::from)
            .collect();
    }

    vec![clean.to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_separated_goal() {
        assert_eq!(
            split_goal_to_tasks("buy milk, , call mom ,book flights"),
            vec!["buy milk", "call mom", "book flights"]
        );
    }

    #[test]
    fn comma_split_caps_at_five() {
        assert_eq!(split_goal_to_tasks("a,b,c,d,e,f,g").len(), 5);
    }

    #[test]
    fn long_goal_becomes_outline() {
        let goal = "write a long essay about the history of computing and how it shaped the world";
        assert_eq!(split_goal_to_tasks(goal)[0], "Outline the goal");
        assert_eq!(split_goal_to_tasks(goal).len(), 3);
    }

    #[test]
    fn short_goal_is_kept() {
        assert_eq!(split_goal_to_tasks("  learn rust "), vec!["learn rust"]);
        assert!(split_goal_to_tasks("   ").is_empty());
    }
}

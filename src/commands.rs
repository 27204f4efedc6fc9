use std::time::Instant;

use tracing::debug;

use crate::protocol;
use crate::store::Keyspace;
use crate::value::{Value, NIL, OK};

const INCORRECT_ARGS: &str = "Incorrect argument number";
const INT_ARG_ERR: &str = "Increment should be an integer";
const FLOAT_ARG_ERR: &str = "Increment should be a float number";
const INDEX_ARG_ERR: &str = "Index should be an integer";

/// Executes one raw request line against the keyspace. `None` means the
/// line was blank and gets no reply at all.
pub fn execute(line: &str, ks: &mut Keyspace) -> Option<String> {
    let tokens = protocol::tokenize(line);
    if tokens.is_empty() {
        return None;
    }
    Some(dispatch(&tokens, ks))
}

/// Routes a tokenised command. The verb is case-insensitive; everything
/// else is taken verbatim.
pub fn dispatch(tokens: &[&str], ks: &mut Keyspace) -> String {
    let start = Instant::now();
    let verb = tokens[0].to_ascii_uppercase();
    let reply = route(&verb, tokens, ks);
    metrics::histogram!("linekv_command_duration_seconds", "command" => verb)
        .record(start.elapsed().as_secs_f64());
    reply
}

fn route(verb: &str, t: &[&str], ks: &mut Keyspace) -> String {
    match verb {
        "GET" | "SET" | "SETNX" | "INCR" | "INCRBY" | "INCRBYFLOAT" | "EXISTS" | "DEL" => {
            string_cmd(verb, t, ks)
        }
        "LPUSH" | "LPOP" | "RPUSH" | "RPOP" | "LRANGE" | "LLEN" => list_cmd(verb, t, ks),
        "HSET" | "HGET" | "HGETALL" | "HKEYS" | "HVALS" | "HSETNX" | "HINCRBY"
        | "HINCRBYFLOAT" => hash_cmd(verb, t, ks),
        "SADD" | "SREM" | "SCARD" | "SISMEMBER" | "SMEMBERS" | "SINTER" | "SUNION" | "SDIFF" => {
            set_cmd(verb, t, ks)
        }
        "ZADD" | "ZREM" | "ZSCORE" | "ZRANK" | "ZCARD" | "ZCOUNT" | "ZINCRBY" | "ZRANGE"
        | "ZRANGEBYSCORE" | "ZINTER" | "ZUNION" => zset_cmd(verb, t, ks),
        _ => format!("Unknown command {verb}"),
    }
}

/// Creates the entry if missing, then runs `op` on it.
fn with_created<F>(ks: &mut Keyspace, key: &str, make: fn() -> Value, op: F) -> String
where
    F: Fn(&mut Value) -> String,
{
    match ks.get_mut(key) {
        Some(v) => op(v),
        None => {
            let mut v = make();
            let reply = op(&mut v);
            ks.insert(key.to_string(), v);
            reply
        }
    }
}

fn string_cmd(verb: &str, t: &[&str], ks: &mut Keyspace) -> String {
    match verb {
        "GET" => {
            if t.len() != 2 {
                return INCORRECT_ARGS.to_string();
            }
            match ks.get(t[1]) {
                Some(v) => v.get(),
                None => NIL.to_string(),
            }
        }
        "SET" => {
            if t.len() != 3 {
                return INCORRECT_ARGS.to_string();
            }
            debug!(key = t[1], "SET");
            with_created(ks, t[1], Value::new_string, |v| v.set(t[2]))
        }
        "SETNX" => {
            if t.len() != 3 {
                return INCORRECT_ARGS.to_string();
            }
            if ks.contains(t[1]) {
                return NIL.to_string();
            }
            with_created(ks, t[1], Value::new_string, |v| v.set(t[2]))
        }
        "INCR" => {
            if t.len() != 2 {
                return INCORRECT_ARGS.to_string();
            }
            match ks.get_mut(t[1]) {
                Some(v) => v.incr(),
                None => NIL.to_string(),
            }
        }
        "INCRBY" => {
            if t.len() != 3 {
                return INCORRECT_ARGS.to_string();
            }
            // A missing key wins over a malformed increment.
            let Some(v) = ks.get_mut(t[1]) else {
                return NIL.to_string();
            };
            match t[2].parse::<i64>() {
                Ok(delta) => v.incr_by(delta),
                Err(_) => INT_ARG_ERR.to_string(),
            }
        }
        "INCRBYFLOAT" => {
            if t.len() != 3 {
                return INCORRECT_ARGS.to_string();
            }
            let Some(v) = ks.get_mut(t[1]) else {
                return NIL.to_string();
            };
            match t[2].parse::<f64>() {
                Ok(delta) => v.incr_by_float(delta),
                Err(_) => FLOAT_ARG_ERR.to_string(),
            }
        }
        "EXISTS" => {
            if t.len() != 2 {
                return INCORRECT_ARGS.to_string();
            }
            if ks.contains(t[1]) {
                "true".to_string()
            } else {
                "false".to_string()
            }
        }
        "DEL" => {
            if t.len() != 2 {
                return INCORRECT_ARGS.to_string();
            }
            debug!(key = t[1], "DEL");
            if ks.remove(t[1]).is_some() {
                OK.to_string()
            } else {
                NIL.to_string()
            }
        }
        _ => unreachable!("verb routed to the wrong family"),
    }
}

fn list_cmd(verb: &str, t: &[&str], ks: &mut Keyspace) -> String {
    match verb {
        "LPUSH" | "RPUSH" => {
            if t.len() != 3 {
                return INCORRECT_ARGS.to_string();
            }
            let head = verb == "LPUSH";
            with_created(ks, t[1], Value::new_list, |v| {
                if head {
                    v.l_push(t[2])
                } else {
                    v.r_push(t[2])
                }
            })
        }
        "LPOP" | "RPOP" => {
            if t.len() != 2 {
                return INCORRECT_ARGS.to_string();
            }
            match ks.get_mut(t[1]) {
                Some(v) if verb == "LPOP" => v.l_pop(),
                Some(v) => v.r_pop(),
                None => NIL.to_string(),
            }
        }
        "LRANGE" => {
            if t.len() != 4 {
                return INCORRECT_ARGS.to_string();
            }
            let Some(v) = ks.get(t[1]) else {
                return NIL.to_string();
            };
            match (t[2].parse::<i64>(), t[3].parse::<i64>()) {
                (Ok(start), Ok(end)) => v.l_range(start, end),
                _ => INDEX_ARG_ERR.to_string(),
            }
        }
        "LLEN" => {
            if t.len() != 2 {
                return INCORRECT_ARGS.to_string();
            }
            match ks.get(t[1]) {
                Some(v) => v.l_len(),
                None => NIL.to_string(),
            }
        }
        _ => unreachable!("verb routed to the wrong family"),
    }
}

fn hash_cmd(verb: &str, t: &[&str], ks: &mut Keyspace) -> String {
    let expected = match verb {
        "HGETALL" | "HKEYS" | "HVALS" => 2,
        "HGET" => 3,
        _ => 4,
    };
    if t.len() != expected {
        return INCORRECT_ARGS.to_string();
    }
    match verb {
        "HSET" | "HSETNX" => {
            let set_nx = verb == "HSETNX";
            with_created(ks, t[1], Value::new_hash, |v| {
                if set_nx {
                    v.h_set_nx(t[2], t[3])
                } else {
                    v.h_set(t[2], t[3])
                }
            })
        }
        "HGET" => match ks.get(t[1]) {
            Some(v) => v.h_get(t[2]),
            None => NIL.to_string(),
        },
        "HGETALL" => match ks.get(t[1]) {
            Some(v) => v.h_get_all(),
            None => NIL.to_string(),
        },
        "HKEYS" => match ks.get(t[1]) {
            Some(v) => v.h_keys(),
            None => NIL.to_string(),
        },
        "HVALS" => match ks.get(t[1]) {
            Some(v) => v.h_vals(),
            None => NIL.to_string(),
        },
        "HINCRBY" => {
            let Some(v) = ks.get_mut(t[1]) else {
                return NIL.to_string();
            };
            match t[3].parse::<i64>() {
                Ok(delta) => v.h_incr_by(t[2], delta),
                Err(_) => INT_ARG_ERR.to_string(),
            }
        }
        "HINCRBYFLOAT" => {
            let Some(v) = ks.get_mut(t[1]) else {
                return NIL.to_string();
            };
            match t[3].parse::<f64>() {
                Ok(delta) => v.h_incr_by_float(t[2], delta),
                Err(_) => FLOAT_ARG_ERR.to_string(),
            }
        }
        _ => unreachable!("verb routed to the wrong family"),
    }
}

fn set_cmd(verb: &str, t: &[&str], ks: &mut Keyspace) -> String {
    let expected = match verb {
        "SCARD" | "SMEMBERS" => 2,
        _ => 3,
    };
    if t.len() != expected {
        return INCORRECT_ARGS.to_string();
    }
    match verb {
        "SADD" => with_created(ks, t[1], Value::new_set, |v| v.s_add(t[2])),
        "SREM" => match ks.get_mut(t[1]) {
            Some(v) => v.s_rem(t[2]),
            None => NIL.to_string(),
        },
        "SCARD" => match ks.get(t[1]) {
            Some(v) => v.s_card(),
            None => NIL.to_string(),
        },
        "SISMEMBER" => match ks.get(t[1]) {
            Some(v) => v.s_is_member(t[2]),
            None => NIL.to_string(),
        },
        "SMEMBERS" => match ks.get(t[1]) {
            Some(v) => v.s_members(),
            None => NIL.to_string(),
        },
        "SINTER" | "SUNION" | "SDIFF" => {
            // A missing operand behaves as a transient empty set.
            let empty = Value::new_set();
            let a = ks.get(t[1]).unwrap_or(&empty);
            let b = ks.get(t[2]).unwrap_or(&empty);
            match verb {
                "SINTER" => a.s_inter(b),
                "SUNION" => a.s_union(b),
                _ => a.s_diff(b),
            }
        }
        _ => unreachable!("verb routed to the wrong family"),
    }
}

/// Parses a score bound; a `(` prefix makes the bound exclusive.
fn parse_bound(token: &str) -> Option<(f64, bool)> {
    let (rest, exclusive) = match token.strip_prefix('(') {
        Some(rest) => (rest, true),
        None => (token, false),
    };
    rest.parse::<f64>().ok().map(|v| (v, exclusive))
}

fn with_scores_flag(t: &[&str], index: usize) -> bool {
    t.get(index).is_some_and(|f| f.eq_ignore_ascii_case("true"))
}

fn zset_cmd(verb: &str, t: &[&str], ks: &mut Keyspace) -> String {
    let arity_ok = match verb {
        "ZCARD" => t.len() == 2,
        "ZREM" | "ZSCORE" | "ZRANK" | "ZINTER" | "ZUNION" => t.len() == 3,
        "ZADD" | "ZCOUNT" | "ZINCRBY" => t.len() == 4,
        // Optional trailing with-scores flag.
        _ => t.len() == 4 || t.len() == 5,
    };
    if !arity_ok {
        return INCORRECT_ARGS.to_string();
    }
    match verb {
        "ZADD" => {
            let Ok(score) = t[2].parse::<f64>() else {
                return FLOAT_ARG_ERR.to_string();
            };
            debug!(key = t[1], member = t[3], "ZADD");
            with_created(ks, t[1], Value::new_sorted, |v| v.z_add(score, t[3]))
        }
        "ZREM" => match ks.get_mut(t[1]) {
            Some(v) => v.z_rem(t[2]),
            None => NIL.to_string(),
        },
        "ZSCORE" => match ks.get(t[1]) {
            Some(v) => v.z_score(t[2]),
            None => NIL.to_string(),
        },
        "ZRANK" => match ks.get(t[1]) {
            Some(v) => v.z_rank(t[2]),
            None => NIL.to_string(),
        },
        "ZCARD" => match ks.get(t[1]) {
            Some(v) => v.z_card(),
            None => NIL.to_string(),
        },
        "ZCOUNT" => {
            let Some(v) = ks.get(t[1]) else {
                return NIL.to_string();
            };
            match (t[2].parse::<f64>(), t[3].parse::<f64>()) {
                (Ok(min), Ok(max)) => v.z_count(min, max),
                _ => FLOAT_ARG_ERR.to_string(),
            }
        }
        "ZINCRBY" => {
            let Some(v) = ks.get_mut(t[1]) else {
                return NIL.to_string();
            };
            match t[2].parse::<f64>() {
                Ok(delta) => v.z_incr_by(delta, t[3]),
                Err(_) => FLOAT_ARG_ERR.to_string(),
            }
        }
        "ZRANGE" => {
            let Some(v) = ks.get(t[1]) else {
                return NIL.to_string();
            };
            match (t[2].parse::<i64>(), t[3].parse::<i64>()) {
                (Ok(start), Ok(end)) => v.z_range(start, end, with_scores_flag(t, 4)),
                _ => INDEX_ARG_ERR.to_string(),
            }
        }
        "ZRANGEBYSCORE" => {
            let Some(v) = ks.get(t[1]) else {
                return NIL.to_string();
            };
            match (parse_bound(t[2]), parse_bound(t[3])) {
                (Some((min, min_ex)), Some((max, max_ex))) => {
                    v.z_range_by_score(min, min_ex, max, max_ex, with_scores_flag(t, 4))
                }
                _ => FLOAT_ARG_ERR.to_string(),
            }
        }
        "ZINTER" | "ZUNION" => {
            let empty = Value::new_sorted();
            let a = ks.get(t[1]).unwrap_or(&empty);
            let b = ks.get(t[2]).unwrap_or(&empty);
            if verb == "ZINTER" {
                a.z_inter(b)
            } else {
                a.z_union(b)
            }
        }
        _ => unreachable!("verb routed to the wrong family"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_ks() -> Keyspace {
        Keyspace::new()
    }

    fn run(ks: &mut Keyspace, line: &str) -> String {
        execute(line, ks).expect("non-empty line should produce a reply")
    }

    // ── Dispatch basics ───────────────────────────────────────────────────

    #[test]
    fn blank_line_gets_no_reply() {
        let mut ks = make_ks();
        assert_eq!(execute("", &mut ks), None);
        assert_eq!(execute("   \r", &mut ks), None);
    }

    #[test]
    fn unknown_verb_is_reported_uppercased() {
        let mut ks = make_ks();
        assert_eq!(run(&mut ks, "blorp x"), "Unknown command BLORP");
    }

    #[test]
    fn verbs_are_case_insensitive() {
        let mut ks = make_ks();
        assert_eq!(run(&mut ks, "set k v"), "OK");
        assert_eq!(run(&mut ks, "GeT k"), "\"v\"");
    }

    // ── Scenario: string lifecycle ────────────────────────────────────────

    #[test]
    fn string_lifecycle() {
        let mut ks = make_ks();
        assert_eq!(run(&mut ks, "SET foo bar"), "OK");
        assert_eq!(run(&mut ks, "GET foo"), "\"bar\"");
        assert_eq!(run(&mut ks, "EXISTS foo"), "true");
        assert_eq!(run(&mut ks, "DEL foo"), "OK");
        assert_eq!(run(&mut ks, "GET foo"), "(nil)");
        assert_eq!(run(&mut ks, "EXISTS foo"), "false");
        assert_eq!(run(&mut ks, "DEL foo"), "(nil)");
    }

    // ── Scenario: numeric strings ─────────────────────────────────────────

    #[test]
    fn numeric_string_increments() {
        let mut ks = make_ks();
        assert_eq!(run(&mut ks, "SET n 10"), "OK");
        assert_eq!(run(&mut ks, "INCR n"), "11");
        assert_eq!(run(&mut ks, "INCRBY n 4"), "15");
        assert_eq!(run(&mut ks, "INCRBYFLOAT n 0.5"), "15.500000");
        assert_eq!(
            run(&mut ks, "INCR n"),
            "Redis string can not be recognized as an integer"
        );
    }

    #[test]
    fn float_increments_downgrade_to_int() {
        let mut ks = make_ks();
        run(&mut ks, "SET k 5");
        run(&mut ks, "INCRBYFLOAT k 0.5");
        run(&mut ks, "INCRBYFLOAT k 0.5");
        assert_eq!(run(&mut ks, "GET k"), "6");
    }

    #[test]
    fn incr_family_on_missing_key_is_nil() {
        let mut ks = make_ks();
        assert_eq!(run(&mut ks, "INCR n"), "(nil)");
        assert_eq!(run(&mut ks, "INCRBY n 4"), "(nil)");
        assert_eq!(run(&mut ks, "INCRBYFLOAT n 0.5"), "(nil)");
        // No auto-created entry either.
        assert_eq!(run(&mut ks, "EXISTS n"), "false");
    }

    #[test]
    fn missing_key_wins_over_bad_increment() {
        let mut ks = make_ks();
        assert_eq!(run(&mut ks, "INCRBY n oops"), "(nil)");
    }

    #[test]
    fn bad_increment_arguments() {
        let mut ks = make_ks();
        run(&mut ks, "SET n 1");
        assert_eq!(run(&mut ks, "INCRBY n oops"), "Increment should be an integer");
        assert_eq!(
            run(&mut ks, "INCRBYFLOAT n oops"),
            "Increment should be a float number"
        );
        assert_eq!(run(&mut ks, "GET n"), "1");
    }

    #[test]
    fn setnx_only_creates() {
        let mut ks = make_ks();
        assert_eq!(run(&mut ks, "SETNX k v"), "OK");
        assert_eq!(run(&mut ks, "SETNX k w"), "(nil)");
        assert_eq!(run(&mut ks, "GET k"), "\"v\"");
    }

    #[test]
    fn set_overwrites_existing_string() {
        let mut ks = make_ks();
        run(&mut ks, "SET k v");
        assert_eq!(run(&mut ks, "SET k w"), "OK");
        assert_eq!(run(&mut ks, "GET k"), "\"w\"");
    }

    #[test]
    fn type_error_never_mutates() {
        let mut ks = make_ks();
        run(&mut ks, "SET k x");
        assert_eq!(run(&mut ks, "LPUSH k v"), "Redis object type error");
        assert_eq!(run(&mut ks, "SADD k v"), "Redis object type error");
        assert_eq!(run(&mut ks, "ZADD k 1 v"), "Redis object type error");
        assert_eq!(run(&mut ks, "HSET k f v"), "Redis object type error");
        assert_eq!(run(&mut ks, "GET k"), "\"x\"");
    }

    // ── Scenario: lists ───────────────────────────────────────────────────

    #[test]
    fn list_lifecycle() {
        let mut ks = make_ks();
        assert_eq!(run(&mut ks, "RPUSH l a"), "OK");
        run(&mut ks, "RPUSH l b");
        run(&mut ks, "RPUSH l c");
        assert_eq!(run(&mut ks, "LRANGE l 0 -1"), "1) a\n2) b\n3) c");
        assert_eq!(run(&mut ks, "LRANGE l -2 -1"), "1) b\n2) c");
        assert_eq!(run(&mut ks, "LPOP l"), "a");
        assert_eq!(run(&mut ks, "LLEN l"), "2");
    }

    #[test]
    fn lpush_prepends() {
        let mut ks = make_ks();
        run(&mut ks, "LPUSH l a");
        run(&mut ks, "LPUSH l b");
        assert_eq!(run(&mut ks, "LRANGE l 0 -1"), "1) b\n2) a");
    }

    #[test]
    fn list_reads_on_missing_key_are_nil() {
        let mut ks = make_ks();
        assert_eq!(run(&mut ks, "LPOP l"), "(nil)");
        assert_eq!(run(&mut ks, "RPOP l"), "(nil)");
        assert_eq!(run(&mut ks, "LRANGE l 0 -1"), "(nil)");
        assert_eq!(run(&mut ks, "LLEN l"), "(nil)");
    }

    #[test]
    fn pop_on_empty_list_is_nil() {
        let mut ks = make_ks();
        run(&mut ks, "RPUSH l a");
        run(&mut ks, "LPOP l");
        assert_eq!(run(&mut ks, "LPOP l"), "(nil)");
        // The emptied entry stays in the keyspace.
        assert_eq!(run(&mut ks, "EXISTS l"), "true");
        assert_eq!(run(&mut ks, "LLEN l"), "0");
    }

    #[test]
    fn lrange_inverted_window_is_empty_array() {
        let mut ks = make_ks();
        run(&mut ks, "RPUSH l a");
        assert_eq!(run(&mut ks, "LRANGE l 1 0"), "(empty array)");
    }

    #[test]
    fn lrange_bad_index_argument() {
        let mut ks = make_ks();
        run(&mut ks, "RPUSH l a");
        assert_eq!(run(&mut ks, "LRANGE l zero -1"), "Index should be an integer");
        assert_eq!(run(&mut ks, "LRANGE l 0 last"), "Index should be an integer");
    }

    // ── Scenario: hashes ──────────────────────────────────────────────────

    #[test]
    fn hash_lifecycle() {
        let mut ks = make_ks();
        assert_eq!(run(&mut ks, "HSET h f 10"), "OK");
        assert_eq!(run(&mut ks, "HINCRBY h f 5"), "15");
        run(&mut ks, "HSET h g hi");
        assert_eq!(
            run(&mut ks, "HINCRBY h g 1"),
            "Hash value can not be recognized as an integer"
        );
        assert_eq!(run(&mut ks, "HGET h f"), "15");
        assert_eq!(run(&mut ks, "HGET h g"), "\"hi\"");
        assert_eq!(run(&mut ks, "HGET h missing"), "(nil)");
    }

    #[test]
    fn hash_reads_on_missing_key_are_nil() {
        let mut ks = make_ks();
        assert_eq!(run(&mut ks, "HGET h f"), "(nil)");
        assert_eq!(run(&mut ks, "HGETALL h"), "(nil)");
        assert_eq!(run(&mut ks, "HKEYS h"), "(nil)");
        assert_eq!(run(&mut ks, "HVALS h"), "(nil)");
        assert_eq!(run(&mut ks, "HINCRBY h f 1"), "(nil)");
        assert_eq!(run(&mut ks, "HINCRBYFLOAT h f 1.5"), "(nil)");
    }

    #[test]
    fn hsetnx_respects_existing_fields() {
        let mut ks = make_ks();
        assert_eq!(run(&mut ks, "HSETNX h f 1"), "OK");
        assert_eq!(run(&mut ks, "HSETNX h f 2"), "(nil)");
        assert_eq!(run(&mut ks, "HGET h f"), "1");
    }

    #[test]
    fn hincrbyfloat_and_bad_arguments() {
        let mut ks = make_ks();
        run(&mut ks, "HSET h f 10");
        assert_eq!(run(&mut ks, "HINCRBYFLOAT h f 0.5"), "10.500000");
        assert_eq!(run(&mut ks, "HINCRBY h f oops"), "Increment should be an integer");
        assert_eq!(
            run(&mut ks, "HINCRBYFLOAT h f oops"),
            "Increment should be a float number"
        );
    }

    #[test]
    fn hgetall_formats_field_and_value() {
        let mut ks = make_ks();
        run(&mut ks, "HSET h f 10");
        assert_eq!(run(&mut ks, "HGETALL h"), "1) f: 10");
    }

    // ── Scenario: sets ────────────────────────────────────────────────────

    #[test]
    fn set_algebra() {
        let mut ks = make_ks();
        run(&mut ks, "SADD s x");
        run(&mut ks, "SADD s y");
        run(&mut ks, "SADD t y");
        run(&mut ks, "SADD t z");
        assert_eq!(run(&mut ks, "SINTER s t"), "1) y");
        assert_eq!(run(&mut ks, "SDIFF s t"), "1) x");
    }

    #[test]
    fn set_reads_on_missing_key_are_nil() {
        let mut ks = make_ks();
        assert_eq!(run(&mut ks, "SREM s x"), "(nil)");
        assert_eq!(run(&mut ks, "SCARD s"), "(nil)");
        assert_eq!(run(&mut ks, "SISMEMBER s x"), "(nil)");
        assert_eq!(run(&mut ks, "SMEMBERS s"), "(nil)");
    }

    #[test]
    fn set_algebra_with_missing_operands_is_empty() {
        let mut ks = make_ks();
        assert_eq!(run(&mut ks, "SINTER a b"), "(empty array)");
        assert_eq!(run(&mut ks, "SUNION a b"), "(empty array)");
        assert_eq!(run(&mut ks, "SDIFF a b"), "(empty array)");
        // Transient operands are not persisted.
        assert_eq!(run(&mut ks, "EXISTS a"), "false");
        run(&mut ks, "SADD a x");
        assert_eq!(run(&mut ks, "SDIFF a b"), "1) x");
        assert_eq!(run(&mut ks, "SINTER a b"), "(empty array)");
    }

    #[test]
    fn set_membership_and_removal() {
        let mut ks = make_ks();
        run(&mut ks, "SADD s x");
        assert_eq!(run(&mut ks, "SISMEMBER s x"), "true");
        assert_eq!(run(&mut ks, "SISMEMBER s y"), "false");
        assert_eq!(run(&mut ks, "SCARD s"), "1");
        assert_eq!(run(&mut ks, "SREM s x"), "OK");
        assert_eq!(run(&mut ks, "SREM s x"), "(nil)");
        assert_eq!(run(&mut ks, "SMEMBERS s"), "(empty array)");
    }

    // ── Scenario: sorted sets ─────────────────────────────────────────────

    #[test]
    fn sorted_set_lifecycle() {
        let mut ks = make_ks();
        assert_eq!(run(&mut ks, "ZADD z 1 a"), "Ok");
        run(&mut ks, "ZADD z 3 c");
        run(&mut ks, "ZADD z 2 b");
        assert_eq!(run(&mut ks, "ZRANGE z 0 -1 false"), "1) a\n2) b\n3) c");
        assert_eq!(run(&mut ks, "ZRANK z b"), "1");
        run(&mut ks, "ZADD z 5 b");
        assert_eq!(run(&mut ks, "ZRANK z b"), "2");
        assert_eq!(run(&mut ks, "ZSCORE z b"), "5");
        assert_eq!(run(&mut ks, "ZCARD z"), "3");
    }

    #[test]
    fn zrange_matches_zcard_and_zrank() {
        let mut ks = make_ks();
        for (score, member) in [(4, "d"), (1, "a"), (3, "c"), (2, "b")] {
            run(&mut ks, &format!("ZADD z {score} {member}"));
        }
        run(&mut ks, "ZREM z c");
        run(&mut ks, "ZINCRBY z 10 a");
        let listing = run(&mut ks, "ZRANGE z 0 -1 false");
        let members: Vec<&str> = listing
            .lines()
            .map(|l| l.split_once(") ").expect("numbered line").1)
            .collect();
        assert_eq!(members.len().to_string(), run(&mut ks, "ZCARD z"));
        for (i, m) in members.iter().enumerate() {
            assert_eq!(run(&mut ks, &format!("ZRANK z {m}")), i.to_string());
        }
    }

    #[test]
    fn zrange_with_scores() {
        let mut ks = make_ks();
        run(&mut ks, "ZADD z 1 a");
        run(&mut ks, "ZADD z 2.5 b");
        assert_eq!(run(&mut ks, "ZRANGE z 0 -1 true"), "1) a 1\n2) b 2.500000");
        assert_eq!(run(&mut ks, "ZRANGE z 0 -1"), "1) a\n2) b");
    }

    #[test]
    fn zrangebyscore_inclusive_and_exclusive() {
        let mut ks = make_ks();
        for (score, member) in [(1, "a"), (2, "b"), (3, "c"), (4, "d")] {
            run(&mut ks, &format!("ZADD z {score} {member}"));
        }
        assert_eq!(run(&mut ks, "ZRANGEBYSCORE z 2 3"), "1) b\n2) c");
        assert_eq!(run(&mut ks, "ZRANGEBYSCORE z (1 (4"), "1) b\n2) c");
        assert_eq!(run(&mut ks, "ZRANGEBYSCORE z (1 4"), "1) b\n2) c\n3) d");
        assert_eq!(run(&mut ks, "ZRANGEBYSCORE z 9 12"), "(empty array)");
    }

    #[test]
    fn zcount_uses_inclusive_bounds() {
        let mut ks = make_ks();
        for (score, member) in [(1, "a"), (2, "b"), (3, "c")] {
            run(&mut ks, &format!("ZADD z {score} {member}"));
        }
        assert_eq!(run(&mut ks, "ZCOUNT z 1 2"), "2");
        assert_eq!(run(&mut ks, "ZCOUNT z 5 9"), "0");
    }

    #[test]
    fn zincrby_requires_existing_member() {
        let mut ks = make_ks();
        run(&mut ks, "ZADD z 1 a");
        assert_eq!(run(&mut ks, "ZINCRBY z 2 a"), "3");
        assert_eq!(run(&mut ks, "ZINCRBY z 2 missing"), "(nil)");
    }

    #[test]
    fn zset_reads_on_missing_key_are_nil() {
        let mut ks = make_ks();
        assert_eq!(run(&mut ks, "ZREM z a"), "(nil)");
        assert_eq!(run(&mut ks, "ZSCORE z a"), "(nil)");
        assert_eq!(run(&mut ks, "ZRANK z a"), "(nil)");
        assert_eq!(run(&mut ks, "ZCARD z"), "(nil)");
        assert_eq!(run(&mut ks, "ZCOUNT z 0 1"), "(nil)");
        assert_eq!(run(&mut ks, "ZINCRBY z 1 a"), "(nil)");
        assert_eq!(run(&mut ks, "ZRANGE z 0 -1"), "(nil)");
        assert_eq!(run(&mut ks, "ZRANGEBYSCORE z 0 1"), "(nil)");
    }

    #[test]
    fn zset_algebra_with_missing_operands_is_empty() {
        let mut ks = make_ks();
        assert_eq!(run(&mut ks, "ZINTER a b"), "(empty array)");
        assert_eq!(run(&mut ks, "ZUNION a b"), "(empty array)");
        assert_eq!(run(&mut ks, "EXISTS a"), "false");
    }

    #[test]
    fn zinter_and_zunion_sum_scores() {
        let mut ks = make_ks();
        run(&mut ks, "ZADD x 1 a");
        run(&mut ks, "ZADD y 2 a");
        run(&mut ks, "ZADD y 9 b");
        assert_eq!(run(&mut ks, "ZINTER x y"), "1) a 3");
        // ZUNION enumerates the left side's members only.
        assert_eq!(run(&mut ks, "ZUNION x y"), "1) a 3");
    }

    #[test]
    fn zadd_bad_score_does_not_create_the_key() {
        let mut ks = make_ks();
        assert_eq!(run(&mut ks, "ZADD z oops a"), "Increment should be a float number");
        assert_eq!(run(&mut ks, "EXISTS z"), "false");
    }

    #[test]
    fn zset_bad_numeric_arguments() {
        let mut ks = make_ks();
        run(&mut ks, "ZADD z 1 a");
        assert_eq!(run(&mut ks, "ZCOUNT z lo hi"), "Increment should be a float number");
        assert_eq!(run(&mut ks, "ZINCRBY z much a"), "Increment should be a float number");
        assert_eq!(run(&mut ks, "ZRANGE z x y"), "Index should be an integer");
        assert_eq!(
            run(&mut ks, "ZRANGEBYSCORE z lo hi"),
            "Increment should be a float number"
        );
    }

    // ── Arity ─────────────────────────────────────────────────────────────

    #[test]
    fn arity_mismatches() {
        let mut ks = make_ks();
        for line in [
            "GET",
            "GET k extra",
            "SET k",
            "SETNX k",
            "INCR",
            "INCRBY k",
            "INCRBYFLOAT k",
            "EXISTS",
            "DEL",
            "LPUSH l",
            "RPUSH l",
            "LPOP",
            "RPOP",
            "LRANGE l 0",
            "LLEN",
            "HSET h f",
            "HGET h",
            "HGETALL h extra",
            "HKEYS",
            "HVALS",
            "HSETNX h f",
            "HINCRBY h f",
            "HINCRBYFLOAT h f",
            "SADD s",
            "SREM s",
            "SCARD",
            "SISMEMBER s",
            "SMEMBERS s extra",
            "SINTER s",
            "SUNION s",
            "SDIFF s",
            "ZADD z 1",
            "ZREM z",
            "ZSCORE z",
            "ZRANK z",
            "ZCARD",
            "ZCOUNT z 1",
            "ZINCRBY z 1",
            "ZRANGE z 0",
            "ZRANGEBYSCORE z 0",
            "ZINTER z",
            "ZUNION z",
        ] {
            assert_eq!(run(&mut ks, line), "Incorrect argument number", "line: {line}");
        }
        assert!(ks.is_empty(), "arity errors must not create keys");
    }
}

use chrono::{DateTime, Local};
use kvcheck_core::history::display::format_records;
use kvcheck_core::history::types::{Bytes, ClientEvent, MessageKind, OpKind, Operation, Outcome};
use kvcheck_parser::Dialect;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Longest simulated operation, in microseconds.
const MAX_DURATION: u64 = 400;
/// Longest think time of a client between two operations, in microseconds.
const MAX_GAP: u64 = 150;

#[derive(Clone, Debug, Default, Deserialize, Serialize, TypedBuilder)]
pub struct GenParams {
    #[builder(default)]
    pub id: u64,
    pub n_client: u64,
    pub n_key: u64,
    /// Operations issued by each client, not counting the initial writes.
    pub n_op: u64,
    /// Probability that an operation is a write.
    #[builder(default = 0.5)]
    pub write_ratio: f64,
    /// Probability that a read returns a superseded value when one exists.
    #[builder(default)]
    pub stale_ratio: f64,
    #[builder(default, setter(strip_option))]
    pub seed: Option<u64>,
}

/// An operation together with the client that issued it.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClientOperation {
    pub client: u64,
    #[serde(flatten)]
    pub operation: Operation,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct History {
    params: GenParams,
    info: String,
    start: DateTime<Local>,
    end: DateTime<Local>,
    data: Vec<ClientOperation>,
}

impl History {
    #[must_use]
    pub const fn new(
        params: GenParams,
        info: String,
        start: DateTime<Local>,
        end: DateTime<Local>,
        data: Vec<ClientOperation>,
    ) -> Self {
        Self {
            params,
            info,
            start,
            end,
            data,
        }
    }

    #[must_use]
    pub const fn get_id(&self) -> u64 {
        self.params.id
    }

    #[must_use]
    pub fn get_data(&self) -> &[ClientOperation] {
        &self.data
    }

    #[must_use]
    pub const fn get_params(&self) -> &GenParams {
        &self.params
    }

    #[must_use]
    pub fn operations(&self) -> Vec<Operation> {
        self.data.iter().map(|op| op.operation.clone()).collect()
    }

    /// The history as a transaction-record log.
    #[must_use]
    pub fn to_records(&self) -> String {
        format_records(&self.operations())
    }

    /// The history as a message log in `dialect`: one request line at each
    /// operation's start and one response line at its end, in time order.
    #[must_use]
    pub fn to_messages(&self, dialect: &Dialect) -> String {
        let mut events: Vec<(&str, ClientEvent)> = self
            .data
            .iter()
            .flat_map(|op| {
                let (request, response) = message_pair(op);
                [("sent", request), ("received", response)]
            })
            .collect();
        // stable, so a request stays ahead of a response logged at the same time
        events.sort_by_key(|(_, event)| event.time);

        events
            .iter()
            .map(|(event_type, event)| dialect.format_event(event_type, event) + "\n")
            .collect()
    }
}

fn message_pair(op: &ClientOperation) -> (ClientEvent, ClientEvent) {
    let ClientOperation { client, operation } = op;
    let (request_kind, response_kind) = match operation.kind {
        OpKind::Read => (MessageKind::ReadRequest, MessageKind::ReadResponse),
        OpKind::Write => (MessageKind::WriteRequest, MessageKind::WriteResponse),
    };
    let request = ClientEvent {
        time: operation.start,
        id: operation.id,
        src: client + 1,
        dest: 0,
        kind: request_kind,
        key: operation.key.clone(),
        value: if operation.is_write() {
            operation.value.clone()
        } else {
            Bytes::new()
        },
        version: None,
        ok: true,
    };
    let response = ClientEvent {
        time: operation.end,
        id: operation.id,
        src: 0,
        dest: client + 1,
        kind: response_kind,
        key: operation.key.clone(),
        value: operation.value.clone(),
        version: operation.version,
        ok: operation.outcome == Outcome::Success,
    };
    (request, response)
}

/// An operation placed in time, before it is applied to the registers.
struct Planned {
    client: u64,
    start: u64,
    end: u64,
    /// The instant inside `start..=end` at which the operation takes effect.
    point: u64,
    kind: OpKind,
    key: u64,
}

/// A committed write in a key's register.
struct Committed {
    value: u64,
    version: u64,
    end: u64,
}

/// Generate one history of `n_client` sequential clients, each issuing
/// `n_op` reads and writes over `n_key` keys.
///
/// # Linearizability invariant
///
/// Every operation takes effect at a point inside its own interval, and
/// operations are applied to a per-key register in the order of those
/// points. Writes bump the key's version, reads return the register's
/// current value. The result is strongly consistent:
///
/// 1. Client 0 writes every key once before any client starts, so reads
///    always have a value to observe.
/// 2. If `t` ends before `u` starts, `t` takes effect first, so `u` never
///    sees an older version than `t`.
///
/// With `stale_ratio > 0`, a read may instead return a value whose
/// successor write had already finished when the read started. Such a read
/// violates strong consistency but still returns a written value, so the
/// history stays eventually consistent.
///
/// All operations succeed. Ids are assigned in order of completion.
#[must_use]
pub fn generate_single_history(params: &GenParams) -> Vec<ClientOperation> {
    if params.n_key == 0 {
        return Vec::new();
    }
    let mut rng = params.seed.map_or_else(
        || StdRng::seed_from_u64(rand::rng().random()),
        StdRng::seed_from_u64,
    );
    let write_ratio = probability(params.write_ratio);
    let stale_ratio = probability(params.stale_ratio);

    let mut planned: Vec<Planned> = (0..params.n_key)
        .map(|key| Planned {
            client: 0,
            start: 2 * key,
            end: 2 * key + 1,
            point: 2 * key,
            kind: OpKind::Write,
            key,
        })
        .collect();

    let origin = 2 * params.n_key;
    for client in 0..params.n_client {
        let mut clock = origin + rng.random_range(0..MAX_GAP);
        for _ in 0..params.n_op {
            let start = clock;
            let end = start + rng.random_range(1..=MAX_DURATION);
            planned.push(Planned {
                client,
                start,
                end,
                point: rng.random_range(start..=end),
                kind: if rng.random_bool(write_ratio) {
                    OpKind::Write
                } else {
                    OpKind::Read
                },
                key: rng.random_range(0..params.n_key),
            });
            clock = end + rng.random_range(1..=MAX_GAP);
        }
    }
    planned.sort_by_key(|op| (op.point, op.start, op.client));

    let mut registers: Vec<Vec<Committed>> = (0..params.n_key).map(|_| Vec::new()).collect();
    let mut next_value = 0;
    let mut data: Vec<ClientOperation> = Vec::with_capacity(planned.len());
    for op in planned {
        let Some(writes) = usize::try_from(op.key)
            .ok()
            .and_then(|key| registers.get_mut(key))
        else {
            continue;
        };
        let (value, version) = match op.kind {
            OpKind::Write => {
                next_value += 1;
                let version = writes.len() as u64 + 1;
                writes.push(Committed {
                    value: next_value,
                    version,
                    end: op.end,
                });
                (next_value, version)
            }
            OpKind::Read => {
                let stale: Vec<&Committed> = writes
                    .windows(2)
                    .filter(|pair| pair[1].end < op.start)
                    .map(|pair| &pair[0])
                    .collect();
                let observed = if !stale.is_empty() && rng.random_bool(stale_ratio) {
                    stale.get(rng.random_range(0..stale.len())).copied()
                } else {
                    writes.last()
                };
                let Some(observed) = observed else {
                    continue;
                };
                (observed.value, observed.version)
            }
        };
        data.push(ClientOperation {
            client: op.client,
            operation: Operation {
                id: 0,
                kind: op.kind,
                key: Bytes::from([op.key]),
                value: Bytes::from([value]),
                start: op.start,
                end: op.end,
                version: Some(version),
                outcome: Outcome::Success,
            },
        });
    }

    data.sort_by_key(|op| (op.operation.end, op.operation.start, op.client));
    for (id, op) in (0..).zip(data.iter_mut()) {
        op.operation.id = id;
    }
    data
}

/// `ratio` clamped into `[0, 1]`; NaN and infinities count as 0.
fn probability(ratio: f64) -> f64 {
    if ratio.is_finite() {
        ratio.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Generate `n_hist` independent histories in parallel. History `i` gets
/// id `i` and, when `params` carries a seed, seed `seed + i`.
#[must_use]
pub fn generate_mult_histories(n_hist: u64, params: &GenParams) -> Vec<History> {
    (0..n_hist)
        .into_par_iter()
        .map(|i_hist| {
            let params = GenParams {
                id: i_hist,
                seed: params.seed.map(|seed| seed.wrapping_add(i_hist)),
                ..params.clone()
            };
            let start_time = Local::now();
            let data = generate_single_history(&params);
            let end_time = Local::now();
            History::new(params, "generated".to_string(), start_time, end_time, data)
        })
        .collect()
}

use common::shapes::{NodeBounds, Rect};
use quadtree::quadtree::{Config, QuadTree};
use quadtree::QuadtreeResult;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::env;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const ARENA_WIDTH: f32 = 960.0;
const ARENA_HEIGHT: f32 = 640.0;
const ENTITY_COUNT: usize = 1500;
const MEASURE_TICKS: usize = 600;
const SIZE_MIN: f32 = 10.0;
const SIZE_MAX: f32 = 20.0;
const SEED: u64 = 36207250;

#[derive(Debug, Clone, Copy)]
struct Motion {
    vx: f32,
    vy: f32,
}

type Entity = Rect<Motion>;

struct SimResult {
    name: &'static str,
    update_ms: f64,
    rebuild_ms: f64,
    collide_ms: f64,
    colliding: usize,
    max_depth: usize,
    max_nodes: usize,
}

fn duration_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<T>().ok())
        .unwrap_or(default)
}

fn generate_entities(seed: u64, bounds: NodeBounds, count: usize) -> Vec<Rc<Entity>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let width = rng.gen_range(SIZE_MIN..SIZE_MAX);
            let height = rng.gen_range(SIZE_MIN..SIZE_MAX);
            let (x, y) = bounds.random_point_inside(width / 2.0, height / 2.0, &mut rng);
            let motion = Motion {
                vx: rng.gen_range(-1.0..1.0),
                vy: rng.gen_range(-1.0..1.0),
            };
            Rc::new(Rect::with_data(
                x - width / 2.0,
                y - height / 2.0,
                width,
                height,
                motion,
            ))
        })
        .collect()
}

// Moves first, then flips velocity once the box pokes past an edge.
fn update_entity(entity: &mut Entity, bounds: &NodeBounds) {
    let Some(motion) = entity.data.as_mut() else {
        return;
    };
    entity.x += motion.vx;
    entity.y += motion.vy;
    let (cx, cy) = (entity.x + entity.width / 2.0, entity.y + entity.height / 2.0);
    if cx - entity.width / 2.0 < bounds.x || cx + entity.width / 2.0 > bounds.right() {
        motion.vx = -motion.vx;
    }
    if cy - entity.height / 2.0 < bounds.y || cy + entity.height / 2.0 > bounds.top() {
        motion.vy = -motion.vy;
    }
}

fn update_all(entities: &mut [Rc<Entity>], bounds: &NodeBounds) -> Duration {
    let start = Instant::now();
    for entity in entities.iter_mut() {
        // The tree is cleared before the update, so this never clones.
        update_entity(Rc::make_mut(entity), bounds);
    }
    start.elapsed()
}

fn run_tree(
    seed: &[Rc<Entity>],
    bounds: NodeBounds,
    config: Config,
    ticks: usize,
) -> QuadtreeResult<SimResult> {
    let mut entities: Vec<Rc<Entity>> = seed.iter().map(|e| Rc::new((**e).clone())).collect();
    let mut tree = QuadTree::new_with_config(bounds, config)?;
    let mut result = SimResult {
        name: "quadtree",
        update_ms: 0.0,
        rebuild_ms: 0.0,
        collide_ms: 0.0,
        colliding: 0,
        max_depth: 0,
        max_nodes: 0,
    };

    let mut candidates = Vec::new();
    for tick in 0..ticks {
        tree.clear();
        result.update_ms += duration_ms(update_all(&mut entities, &bounds));

        let start = Instant::now();
        tree.rebuild(entities.iter().cloned())?;
        result.rebuild_ms += duration_ms(start.elapsed());

        let start = Instant::now();
        for entity in &entities {
            candidates.clear();
            tree.retrieve_into(&**entity, &mut candidates);
            if candidates.iter().any(|other| other.overlaps(&**entity)) {
                result.colliding += 1;
            }
        }
        result.collide_ms += duration_ms(start.elapsed());

        let depth = tree.depth();
        let nodes = tree.node_count();
        result.max_depth = result.max_depth.max(depth);
        result.max_nodes = result.max_nodes.max(nodes);
        debug!(tick, depth, nodes, "tick done");
    }
    tree.clear();
    Ok(result)
}

fn run_brute_force(seed: &[Rc<Entity>], bounds: NodeBounds, ticks: usize) -> SimResult {
    let mut entities: Vec<Rc<Entity>> = seed.iter().map(|e| Rc::new((**e).clone())).collect();
    let mut result = SimResult {
        name: "brute force",
        update_ms: 0.0,
        rebuild_ms: 0.0,
        collide_ms: 0.0,
        colliding: 0,
        max_depth: 0,
        max_nodes: 0,
    };

    for _ in 0..ticks {
        result.update_ms += duration_ms(update_all(&mut entities, &bounds));

        let start = Instant::now();
        for (i, entity) in entities.iter().enumerate() {
            let hit = entities
                .iter()
                .enumerate()
                .any(|(k, other)| k != i && other.overlaps(&**entity));
            if hit {
                result.colliding += 1;
            }
        }
        result.collide_ms += duration_ms(start.elapsed());
    }
    result
}

fn print_result(result: &SimResult) {
    println!("{}", result.name);
    println!("  Update: {:.02}ms", result.update_ms);
    println!("  Rebuild: {:.02}ms", result.rebuild_ms);
    println!("  Collide: {:.02}ms", result.collide_ms);
    println!(
        "  Tick total: {:.02}ms",
        result.update_ms + result.rebuild_ms + result.collide_ms
    );
    println!("  Colliding entity-ticks: {}", result.colliding);
    if result.max_nodes > 0 {
        println!(
            "  Deepest level: {}, most nodes: {}",
            result.max_depth, result.max_nodes
        );
    }
    println!();
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let bounds = NodeBounds::new(
        -ARENA_WIDTH * 0.5,
        -ARENA_HEIGHT * 0.5,
        ARENA_WIDTH,
        ARENA_HEIGHT,
    );
    let defaults = Config::default();
    let config = Config {
        max_objects: env_or("SIM_MAX_OBJECTS", defaults.max_objects),
        max_levels: env_or("SIM_MAX_LEVELS", defaults.max_levels),
    };
    let ticks = env_or("SIM_TICKS", MEASURE_TICKS);
    let entity_count = env_or("SIM_ENTITIES", ENTITY_COUNT);

    println!("Simulation settings:");
    println!(
        "Arena size:       {:.01} x {:.01}",
        ARENA_WIDTH, ARENA_HEIGHT
    );
    println!("Entity size:      From {:.01} to {:.01}", SIZE_MIN, SIZE_MAX);
    println!("Seed:             {}", SEED);
    println!("Measure ticks:    {}", ticks);
    println!("Entity count:     {}", entity_count);
    println!(
        "Split policy:     max_objects {}, max_levels {}",
        config.max_objects, config.max_levels
    );
    println!();

    let entities = generate_entities(SEED, bounds, entity_count);
    info!(count = entities.len(), "generated entities");

    let tree = match run_tree(&entities, bounds, config, ticks) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("quadtree simulation failed: {err}");
            std::process::exit(1);
        }
    };
    let brute = run_brute_force(&entities, bounds, ticks);

    print_result(&tree);
    print_result(&brute);

    if tree.colliding != brute.colliding {
        eprintln!(
            "mismatch: quadtree saw {} colliding entity-ticks, brute force {}",
            tree.colliding, brute.colliding
        );
        std::process::exit(1);
    }
}

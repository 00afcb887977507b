//! Headless Skirmish Runner
//!
//! Drives a scripted encounter against an in-memory world adapter so squad
//! behavior can be watched from the command line.

use ahash::AHashMap;
use clap::Parser;

use retinue::core::config::TacticsConfig;
use retinue::core::types::{AgentId, EnemyId, GridPos};
use retinue::squad::{
    AbilityKind, AgentConfig, CharacterSnapshot, EnemyDescriptor, EnemyKind, LateralDir, Manager,
    PartyMember, Role, WorldAdapter,
};

/// Headless Skirmish Runner - scripted encounter for squad AI
#[derive(Parser, Debug)]
#[command(name = "skirmish")]
#[command(about = "Run a scripted squad-vs-camp encounter and trace the AI")]
struct Args {
    /// Ticks to simulate
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Random seed for deterministic runs
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Enable verbose AI logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// Damage per landed attack in the demo world
const ATTACK_DAMAGE: f32 = 25.0;
/// How far an attack can reach in the demo world
const ATTACK_RANGE: u32 = 12;

struct DemoEnemy {
    descriptor: EnemyDescriptor,
    hp: f32,
}

/// Minimal host-engine stand-in: executes movement one tile at a time and
/// resolves attacks against the nearest enemy in reach
struct DemoWorld {
    agents: AHashMap<AgentId, CharacterSnapshot>,
    enemies: Vec<DemoEnemy>,
    abilities_used: u64,
    moves_executed: u64,
}

impl DemoWorld {
    fn new() -> Self {
        Self {
            agents: AHashMap::new(),
            enemies: Vec::new(),
            abilities_used: 0,
            moves_executed: 0,
        }
    }

    fn spawn_agent(&mut self, pos: GridPos, hp_pct: f32) -> AgentId {
        let id = AgentId::new();
        self.agents.insert(
            id,
            CharacterSnapshot {
                pos,
                hp_pct,
                alive: true,
            },
        );
        id
    }

    fn spawn_enemy(&mut self, id: u32, pos: GridPos, kind: EnemyKind) {
        self.enemies.push(DemoEnemy {
            descriptor: EnemyDescriptor {
                id: EnemyId(id),
                pos,
                kind,
            },
            hp: 100.0,
        });
    }

    fn step(from: GridPos, toward: GridPos) -> GridPos {
        if from.x != toward.x {
            GridPos::new(from.x + (toward.x - from.x).signum(), from.y)
        } else if from.y != toward.y {
            GridPos::new(from.x, from.y + (toward.y - from.y).signum())
        } else {
            from
        }
    }

    fn shift(&mut self, agent: AgentId, to: GridPos) {
        if let Some(snapshot) = self.agents.get_mut(&agent) {
            snapshot.pos = to;
            self.moves_executed += 1;
        }
    }

    fn living_enemies(&self) -> usize {
        self.enemies.iter().filter(|e| e.hp > 0.0).count()
    }
}

impl WorldAdapter for DemoWorld {
    fn character_for_agent(&self, id: AgentId) -> Option<CharacterSnapshot> {
        self.agents.get(&id).copied()
    }

    fn enemies_in_zone(&self) -> Vec<EnemyDescriptor> {
        self.enemies
            .iter()
            .filter(|e| e.hp > 0.0)
            .map(|e| e.descriptor)
            .collect()
    }

    fn move_toward(&mut self, agent: AgentId, target: GridPos) {
        if let Some(snapshot) = self.agents.get(&agent).copied() {
            let next = Self::step(snapshot.pos, target);
            self.shift(agent, next);
        }
    }

    fn move_away(&mut self, agent: AgentId, target: GridPos) {
        if let Some(snapshot) = self.agents.get(&agent).copied() {
            let step = Self::step(snapshot.pos, target);
            let retreat = GridPos::new(
                snapshot.pos.x - (step.x - snapshot.pos.x),
                snapshot.pos.y - (step.y - snapshot.pos.y),
            );
            self.shift(agent, retreat);
        }
    }

    fn sidestep(&mut self, agent: AgentId, target: GridPos, dir: LateralDir) {
        if let Some(snapshot) = self.agents.get(&agent).copied() {
            // Perpendicular to the dominant axis toward the target
            let horizontal = (target.x - snapshot.pos.x).abs() >= (target.y - snapshot.pos.y).abs();
            let sign = match dir {
                LateralDir::Left => -1,
                LateralDir::Right => 1,
            };
            let next = if horizontal {
                GridPos::new(snapshot.pos.x, snapshot.pos.y + sign)
            } else {
                GridPos::new(snapshot.pos.x + sign, snapshot.pos.y)
            };
            self.shift(agent, next);
        }
    }

    fn use_ability(&mut self, agent: AgentId, ability: &str, kind: AbilityKind) -> bool {
        self.abilities_used += 1;
        let Some(snapshot) = self.agents.get(&agent).copied() else {
            return false;
        };
        if kind == AbilityKind::Attack {
            let target = self
                .enemies
                .iter_mut()
                .filter(|e| e.hp > 0.0)
                .filter(|e| e.descriptor.pos.manhattan(&snapshot.pos) <= ATTACK_RANGE)
                .min_by_key(|e| e.descriptor.pos.manhattan(&snapshot.pos));
            if let Some(enemy) = target {
                enemy.hp -= ATTACK_DAMAGE;
                tracing::debug!(
                    ability,
                    enemy = enemy.descriptor.id.0,
                    hp = enemy.hp,
                    "attack landed"
                );
                return true;
            }
            return false;
        }
        tracing::debug!(ability, ?kind, "support ability triggered");
        true
    }

    fn apply_support_effect(&mut self, _user: AgentId, target: AgentId, effect: &str) -> bool {
        if let Some(snapshot) = self.agents.get_mut(&target) {
            if effect == "mend" {
                snapshot.hp_pct = (snapshot.hp_pct + 30.0).min(100.0);
            }
            return true;
        }
        false
    }
}

fn build_party(world: &mut DemoWorld, leader: AgentId) -> Vec<PartyMember> {
    let mut tank = AgentConfig::for_role(Role::Tank);
    tank.attack_ability = Some("shield_slam".to_string());

    let mut bruiser = AgentConfig::for_role(Role::Melee);
    bruiser.attack_ability = Some("cleave".to_string());

    let mut archer = AgentConfig::for_role(Role::Ranged);
    archer.attack_ability = Some("arrow".to_string());

    let mut medic = AgentConfig::for_role(Role::Healer);
    medic.heal_ability = Some("mend".to_string());
    medic.buff_ability = Some("ward".to_string());
    medic.defend_ability = Some("barrier".to_string());

    // The bruiser starts wounded so triage has something to do
    let bruiser_id = world.spawn_agent(GridPos::new(1, 1), 55.0);

    vec![
        PartyMember {
            id: leader,
            config: AgentConfig::for_role(Role::Melee),
        },
        PartyMember {
            id: world.spawn_agent(GridPos::new(1, 0), 100.0),
            config: tank,
        },
        PartyMember {
            id: bruiser_id,
            config: bruiser,
        },
        PartyMember {
            id: world.spawn_agent(GridPos::new(0, 1), 100.0),
            config: archer,
        },
        PartyMember {
            id: world.spawn_agent(GridPos::new(0, 2), 100.0),
            config: medic,
        },
    ]
}

fn main() {
    let args = Args::parse();

    let filter = if args.verbose {
        "retinue=debug,skirmish=debug"
    } else {
        "retinue=info,skirmish=info"
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut world = DemoWorld::new();
    let leader = world.spawn_agent(GridPos::new(0, 0), 100.0);

    // A small camp to the east: two melee guards and an archer
    world.spawn_enemy(1, GridPos::new(30, 0), EnemyKind::Melee);
    world.spawn_enemy(2, GridPos::new(32, 2), EnemyKind::Melee);
    world.spawn_enemy(3, GridPos::new(34, 0), EnemyKind::Ranged);

    let party = build_party(&mut world, leader);

    let tunables = TacticsConfig::default();
    if let Err(reason) = tunables.validate() {
        eprintln!("invalid tunables: {}", reason);
        std::process::exit(1);
    }

    let mut manager = Manager::with_seed(tunables, leader, args.seed);
    manager.sync_roster(&party);

    println!("=== SKIRMISH ===");
    println!("party of {} vs camp of {}", party.len(), world.living_enemies());

    for tick in 0..args.ticks {
        // The "player" walks the leader toward the camp until contact
        if !manager.blackboard().combat_active() {
            if let Some(snapshot) = world.agents.get(&leader).copied() {
                let next = DemoWorld::step(snapshot.pos, GridPos::new(30, 0));
                world.shift(leader, next);
            }
        }

        manager.tick(&mut world);

        if world.living_enemies() == 0 {
            println!("camp cleared on tick {}", tick);
            break;
        }
    }

    println!("enemies remaining: {}", world.living_enemies());
    println!("moves executed:    {}", world.moves_executed);
    println!("abilities used:    {}", world.abilities_used);
}

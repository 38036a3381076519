/// Entry point and game loop.

mod config;
mod domain;
mod logging;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{KeyCode, MouseButton};
use tracing::{info, warn};

use config::GameConfig;
use domain::ability::AbilityId;
use domain::collision::Vec2;
use domain::entity::{FireCommand, FrameInput, MoveIntent};
use sim::event::GameEvent;
use sim::world::{Phase, WorldState};
use sim::{inventory, progression, step};
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::{Overlay, Renderer};
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);
/// How far ahead of the player a stick aim lands.
const STICK_AIM_REACH: f32 = 200.0;

fn main() -> Result<()> {
    logging::init(&config::log_dir());
    let config = GameConfig::load();
    info!(seed = ?config.seed, "starting keybound");

    let mut world = WorldState::new(config.arena, config.seed);
    world.effects.enabled = config.particles;

    let mut renderer = Renderer::new();
    renderer.init().context("terminal init failed")?;

    let sound = SoundEngine::new();
    if sound.is_none() {
        warn!("no audio device, sound disabled");
    }

    let result = game_loop(&mut world, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        warn!("terminal cleanup failed: {e}");
        eprintln!("Terminal cleanup failed: {e}");
    }

    result?;
    info!(room = world.current_room, keys = world.keys_collected, "quit");
    println!();
    println!("Thanks for playing Keybound!");
    println!("Deepest room: {}", world.current_room + 1);
    Ok(())
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<()> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    info!(connected = gp.connected, "gamepad");
    let mut overlay = Overlay::default();
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);
    let lag_threshold = Duration::from_millis(config.speed.lag_threshold_ms);

    let mut pending_fire: Option<FireCommand> = None;

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }

        let mut events = Vec::new();
        if handle_meta(world, &kb, &gp, &mut overlay, &mut events) {
            break;
        }
        process_sound_events(sound, &events);

        if world.phase.is_live() && !world.paused && !overlay.inventory_open {
            if let Some(fire) = detect_fire(&kb, &gp) {
                pending_fire = Some(fire);
            }
        }

        let elapsed = last_tick.elapsed();
        if elapsed >= tick_rate {
            let frame_input = FrameInput {
                movement: detect_movement(&kb, &gp),
                aim: detect_aim(world, renderer, &kb, &gp),
                fire: pending_fire.take(),
                lagging: elapsed > lag_threshold,
            };
            let events = step::step(world, frame_input);
            process_sound_events(sound, &events);
            last_tick = Instant::now();
        }

        renderer.render(world, &overlay).context("render failed")?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::AbilityUsed { .. } => sfx.play_cast(),
            GameEvent::EnemyHit { .. }
            | GameEvent::ShieldBlocked
            | GameEvent::BombDetonated { .. } => sfx.play_hit(),
            GameEvent::PlayerHurt { .. } => sfx.play_hurt(),
            GameEvent::PickupCollected { .. } | GameEvent::ItemActivated { .. } => sfx.play_pickup(),
            GameEvent::KeyCollected { .. } => sfx.play_key(),
            GameEvent::BossOffered { .. } | GameEvent::BossArenaEntered { .. } => sfx.play_alarm(),
            GameEvent::BossDefeated
            | GameEvent::UpgradeChosen { .. }
            | GameEvent::AbilityUnlocked { .. }
            | GameEvent::Victory => sfx.play_fanfare(),
            GameEvent::GameOver => sfx.play_death(),
            _ => {}
        }
    }
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_FIRE: [&[KeyCode]; 3] = [
    &[KeyCode::Char('j'), KeyCode::Char('J')],
    &[KeyCode::Char('k'), KeyCode::Char('K')],
    &[KeyCode::Char('l'), KeyCode::Char('L')],
];
const KEYS_LIGHTNING: &[KeyCode] = &[KeyCode::Char('f'), KeyCode::Char('F')];
const KEYS_INVENTORY: &[KeyCode] = &[KeyCode::Tab, KeyCode::Char('i'), KeyCode::Char('I')];
const KEYS_PAUSE: &[KeyCode] = &[KeyCode::F(1), KeyCode::Char('p'), KeyCode::Char('P')];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_ACCEPT: &[KeyCode] = &[KeyCode::Char('y'), KeyCode::Char('Y'), KeyCode::Enter];
const KEYS_DECLINE: &[KeyCode] = &[KeyCode::Char('n'), KeyCode::Char('N'), KeyCode::Esc];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q'), KeyCode::Esc];
const KEYS_UNEQUIP: [&[KeyCode]; 3] = [
    &[KeyCode::Char('z'), KeyCode::Char('Z')],
    &[KeyCode::Char('x'), KeyCode::Char('X')],
    &[KeyCode::Char('c'), KeyCode::Char('C')],
];

fn detect_movement(kb: &InputState, gp: &GamepadState) -> MoveIntent {
    let held = |keys: &[KeyCode]| kb.any_held(keys) || kb.any_pressed(keys);
    let left = held(KEYS_LEFT) || gp.left_held();
    let right = held(KEYS_RIGHT) || gp.right_held();
    let up = held(KEYS_UP) || gp.up_held();
    let down = held(KEYS_DOWN) || gp.down_held();
    MoveIntent {
        dx: right as i8 - left as i8,
        dy: down as i8 - up as i8,
    }
}

/// Edge-triggered cast: digits 1-3, J/K/L, mouse buttons, pad face buttons.
fn detect_fire(kb: &InputState, gp: &GamepadState) -> Option<FireCommand> {
    match kb.digit_pressed() {
        Some(d @ 0..=2) => return Some(FireCommand::Slot(d)),
        Some(3) => return Some(FireCommand::Lightning),
        _ => {}
    }
    if let Some(slot) = (0..3).find(|&i| kb.any_pressed(KEYS_FIRE[i])) {
        return Some(FireCommand::Slot(slot));
    }
    if kb.any_pressed(KEYS_LIGHTNING) || gp.lightning_pressed() {
        return Some(FireCommand::Lightning);
    }
    if kb.clicked(MouseButton::Left) {
        return Some(FireCommand::Slot(0));
    }
    if kb.clicked(MouseButton::Right) {
        return Some(FireCommand::Slot(1));
    }
    gp.fire_pressed().map(FireCommand::Slot)
}

/// Right stick first, then the mouse cell. `None` lets the sim auto-aim.
fn detect_aim(world: &WorldState, renderer: &Renderer, kb: &InputState, gp: &GamepadState) -> Option<Vec2> {
    if let Some((dx, dy)) = gp.aim_direction() {
        let dir = Vec2::new(dx, dy).normalized();
        return Some(world.player.pos + dir * STICK_AIM_REACH);
    }
    kb.mouse_cell.and_then(|(col, row)| renderer.cell_to_arena(col, row))
}

/// Phase-level commands. Returns true when the player quits.
fn handle_meta(
    world: &mut WorldState,
    kb: &InputState,
    gp: &GamepadState,
    overlay: &mut Overlay,
    events: &mut Vec<GameEvent>,
) -> bool {
    let confirm = kb.any_pressed(KEYS_CONFIRM) || gp.confirm_pressed();
    let cancel = kb.any_pressed(&[KeyCode::Esc]) || gp.cancel_pressed();

    if !world.phase.is_live() {
        overlay.inventory_open = false;
    }

    // ── Pause (live phases only) ──
    if world.phase.is_live() && kb.any_pressed(KEYS_PAUSE) {
        if progression::toggle_pause(world) {
            info!(paused = world.paused, "pause toggled");
        }
        return false;
    }
    if world.paused {
        if kb.any_pressed(KEYS_RESTART) {
            overlay.inventory_open = false;
            progression::start_game(world, events);
        } else if cancel {
            overlay.inventory_open = false;
            world.reset();
            info!("returned to title");
        }
        return false;
    }

    match world.phase {
        // ── Title Screen ──
        Phase::Title => {
            if confirm {
                progression::start_game(world, events);
            } else if kb.any_pressed(KEYS_QUIT) || gp.cancel_pressed() {
                return true;
            }
        }

        // ── Live play ──
        Phase::InRoom | Phase::InBossArena => {
            if kb.any_pressed(KEYS_INVENTORY) || gp.inventory_pressed() {
                overlay.inventory_open = !overlay.inventory_open;
                overlay.roster_cursor = 0;
                return false;
            }
            if overlay.inventory_open {
                handle_inventory_panel(world, kb, gp, overlay, events);
            }
        }

        // ── Boss Offer ──
        Phase::BossOffered => {
            if kb.any_pressed(KEYS_ACCEPT) || gp.confirm_pressed() {
                progression::accept_boss(world, events);
            } else if kb.any_pressed(KEYS_DECLINE) || gp.cancel_pressed() {
                progression::decline_boss(world, events);
            }
        }

        // ── Upgrade Choice ──
        Phase::UpgradeChoice => {
            let pick = kb.digit_pressed()
                .filter(|&d| d < AbilityId::BASE.len())
                .or_else(|| gp.fire_pressed());
            if let Some(i) = pick {
                progression::choose_upgrade(world, AbilityId::BASE[i], events);
            }
        }

        // ── Victory ──
        Phase::Victory => {
            if kb.any_pressed(KEYS_RESTART) {
                progression::start_game(world, events);
            } else if confirm || cancel {
                world.reset();
                info!("returned to title");
            }
        }

        // Countdowns run on their own.
        Phase::UpgradeCountdown | Phase::GameOver => {}
    }

    false
}

/// Inventory & loadout panel: digits use items, brackets move the roster
/// cursor, Enter equips, Z/X/C clear a slot, Esc closes.
fn handle_inventory_panel(
    world: &mut WorldState,
    kb: &InputState,
    gp: &GamepadState,
    overlay: &mut Overlay,
    events: &mut Vec<GameEvent>,
) {
    if let Some(slot) = kb.digit_pressed() {
        inventory::activate_item(world, slot, events);
        return;
    }

    let roster = world.unlocked_roster();
    if roster.is_empty() {
        return;
    }
    if kb.was_pressed(KeyCode::Char('[')) {
        overlay.roster_cursor = overlay.roster_cursor.checked_sub(1).unwrap_or(roster.len() - 1);
    } else if kb.was_pressed(KeyCode::Char(']')) {
        overlay.roster_cursor = (overlay.roster_cursor + 1) % roster.len();
    }
    overlay.roster_cursor = overlay.roster_cursor.min(roster.len() - 1);

    if kb.any_pressed(KEYS_CONFIRM) || gp.confirm_pressed() {
        inventory::equip(world, roster[overlay.roster_cursor]);
    } else if let Some(slot) = (0..3).find(|&i| kb.any_pressed(KEYS_UNEQUIP[i])) {
        inventory::unequip(world, slot);
    } else if kb.any_pressed(&[KeyCode::Esc]) || gp.cancel_pressed() {
        overlay.inventory_open = false;
    }
}

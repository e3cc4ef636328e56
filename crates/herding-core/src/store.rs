/// Player currency and purchase counters. Consulted by the host for
/// affordability; the simulation core only touches the whistle stock.
#[derive(Clone, Debug)]
pub struct GameStore {
    pub money: u64,
    pub owned_dogs: u32,
    pub speed_level: u32,
    pub whistles: u32,
}

/// Whistles available at level start and restored on completion.
pub const INITIAL_WHISTLES: u32 = 3;

impl Default for GameStore {
    fn default() -> Self {
        Self {
            money: 0,
            owned_dogs: 0,
            speed_level: 0,
            whistles: INITIAL_WHISTLES,
        }
    }
}

impl GameStore {
    pub fn award(&mut self, amount: u64) {
        self.money += amount;
    }

    pub fn try_buy_dog(&mut self, cost: u64) -> bool {
        if self.money >= cost {
            self.money -= cost;
            self.owned_dogs += 1;
            true
        } else {
            false
        }
    }

    pub fn try_buy_speed(&mut self, cost: u64) -> bool {
        if self.money >= cost {
            self.money -= cost;
            self.speed_level += 1;
            true
        } else {
            false
        }
    }
}

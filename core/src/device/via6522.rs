//! MOS 6522 Versatile Interface Adapter (VIA)
//!
//! Two 8-bit parallel ports with per-bit data direction, two interrupt
//! timers (T1: 16-bit latch, one-shot or free-run; T2: 8-bit latch,
//! one-shot only), four edge-sensitive control lines, and the 6522's
//! interrupt flag/enable pair. The shift register is stored but not
//! actively clocked.
//!
//! A system with two VIAs instantiates this type twice; there is no
//! per-chip specialization.

/// Register indices, as selected by the RS3..RS0 address lines.
pub mod reg {
    pub const ORB_IRB: u8 = 0x0;
    pub const ORA_IRA: u8 = 0x1;
    pub const DDRB: u8 = 0x2;
    pub const DDRA: u8 = 0x3;
    pub const T1_C_LO: u8 = 0x4;
    pub const T1_C_HI: u8 = 0x5;
    pub const T1_L_LO: u8 = 0x6;
    pub const T1_L_HI: u8 = 0x7;
    pub const T2_C_LO: u8 = 0x8;
    pub const T2_C_HI: u8 = 0x9;
    pub const SR: u8 = 0xA;
    pub const ACR: u8 = 0xB;
    pub const PCR: u8 = 0xC;
    pub const IFR: u8 = 0xD;
    pub const IER: u8 = 0xE;
    /// Port A access without the CA1/CA2 handshake side effects.
    pub const ORA_IRA_NH: u8 = 0xF;
}

/// Interrupt bits, shared by IFR and IER.
pub mod irq {
    pub const CA2: u8 = 0x01;
    pub const CA1: u8 = 0x02;
    pub const SR: u8 = 0x04;
    pub const CB2: u8 = 0x08;
    pub const CB1: u8 = 0x10;
    pub const T2: u8 = 0x20;
    pub const T1: u8 = 0x40;
    /// IER bit 7: set/clear select on write, forced high on read.
    /// IFR bit 7: computed "any enabled flag set" summary.
    pub const CTRL: u8 = 0x80;
}

// ACR bits this model acts on.
const ACR_T2_COUNT_PULSES: u8 = 0x20;
const ACR_T1_FREE_RUN: u8 = 0x40;

pub struct Via6522 {
    // Timers. Counters are i32 so a decrement can cross zero and the
    // reload arithmetic stays in one domain; the live value presented to
    // software is the low 16 bits.
    t1_counter: i32,
    t1_latch: u16,
    t2_counter: i32,
    t2_latch: u8, // timer 2 latch is 8 bits
    t1_fired: bool,
    t2_fired: bool,

    // Interrupt inputs CA1/CB1 carry the previous value for edge
    // detection; CA2/CB2 only need their current level here.
    ca1: bool,
    ca1_prev: bool,
    ca2: bool,
    cb1: bool,
    cb1_prev: bool,
    cb2: bool,

    // Ports.
    ddra: u8,
    ddrb: u8,
    pa: u8,  // what is electrically present on port A
    pb: u8,  // what is electrically present on port B
    ira: u8, // input register A
    irb: u8, // input register B
    ora: u8, // output register A
    orb: u8, // output register B

    ifr: u8,
    ier: u8,
    acr: u8,
    pcr: u8,
    sr: u8,
}

impl Via6522 {
    pub fn new() -> Self {
        Self {
            t1_counter: 0,
            t1_latch: 0,
            t2_counter: 0,
            t2_latch: 0,
            t1_fired: false,
            t2_fired: false,
            ca1: false,
            ca1_prev: false,
            ca2: false,
            cb1: false,
            cb1_prev: false,
            cb2: false,
            ddra: 0,
            ddrb: 0,
            // Undriven port pins float high.
            pa: 0xFF,
            pb: 0xFF,
            ira: 0xFF,
            irb: 0xFF,
            ora: 0,
            orb: 0,
            ifr: 0,
            ier: 0,
            acr: 0,
            pcr: 0,
            sr: 0,
        }
    }

    /// Return to the canonical power-on state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    // IRB mixes the pins for input bits with ORB for output bits; IRA is
    // always exactly the pins. These two invariants hold after every
    // state-changing operation.
    fn refresh_port_b(&mut self) {
        self.pb = (self.orb & self.ddrb) | (self.pb & !self.ddrb);
        self.irb = (self.pb & !self.ddrb) | (self.orb & self.ddrb);
    }

    fn refresh_port_a(&mut self) {
        self.pa = (self.ora & self.ddra) | (self.pa & !self.ddra);
        self.ira = self.pa;
    }

    /// Write a register. `index` is masked to 0..15.
    pub fn write_reg(&mut self, index: u8, value: u8) {
        match index & 0x0F {
            reg::ORB_IRB => {
                self.orb = value;
                self.refresh_port_b();
                // Writing the port acknowledges its control lines.
                self.ifr &= !(irq::CB1 | irq::CB2);
            }

            reg::ORA_IRA => {
                self.ifr &= !(irq::CA1 | irq::CA2);
                self.ora = value;
                self.refresh_port_a();
            }

            reg::ORA_IRA_NH => {
                self.ora = value;
                self.refresh_port_a();
            }

            reg::DDRB => {
                self.ddrb = value;
                self.refresh_port_b();
            }

            reg::DDRA => {
                self.ddra = value;
                self.refresh_port_a();
            }

            // T1C-L and T1L-L are the same location: only the latch low
            // byte is updated; the live counter is untouched.
            reg::T1_C_LO | reg::T1_L_LO => {
                self.t1_latch = (self.t1_latch & 0xFF00) | value as u16;
            }

            // Writing the high-order counter also transfers the latch
            // into the live counter — this is how software (re)starts T1.
            reg::T1_C_HI => {
                self.t1_latch = (self.t1_latch & 0x00FF) | (value as u16) << 8;
                self.t1_counter = self.t1_latch as i32;
                self.ifr &= !irq::T1;
                self.t1_fired = false;
            }

            // High-order latch only: no counter transfer.
            reg::T1_L_HI => {
                self.t1_latch = (self.t1_latch & 0x00FF) | (value as u16) << 8;
                self.ifr &= !irq::T1;
            }

            reg::T2_C_LO => {
                self.t2_latch = value;
            }

            reg::T2_C_HI => {
                self.t2_counter = ((value as i32) << 8) | self.t2_latch as i32;
                self.ifr &= !irq::T2;
                self.t2_fired = false;
            }

            reg::SR => {
                self.sr = value;
            }

            reg::ACR => {
                self.acr = value;
            }

            reg::PCR => {
                self.pcr = value;
                // CA2/CB2 are forced only by the manual-output field
                // values; the other modes are latched but act elsewhere.
                match (self.pcr >> 1) & 0b111 {
                    0b110 => self.ca2 = false,
                    0b111 => self.ca2 = true,
                    _ => {}
                }
                match (self.pcr >> 5) & 0b111 {
                    0b110 => self.cb2 = false,
                    0b111 => self.cb2 = true,
                    _ => {}
                }
            }

            // Each written 1 clears that flag; bit 7 is never writable.
            reg::IFR => {
                self.ifr &= !value & 0x7F;
            }

            // Bit 7 selects set (1) or clear (0) of the written low bits.
            reg::IER => {
                if value & irq::CTRL != 0 {
                    self.ier |= value & 0x7F;
                } else {
                    self.ier &= !value & 0x7F;
                }
            }

            _ => unreachable!(),
        }
    }

    /// Read a register. `index` is masked to 0..15. Reading a port or a
    /// timer low byte acknowledges the matching interrupt flags.
    pub fn read_reg(&mut self, index: u8) -> u8 {
        match index & 0x0F {
            reg::ORB_IRB => {
                self.ifr &= !(irq::CB1 | irq::CB2);
                self.irb
            }

            reg::ORA_IRA => {
                self.ifr &= !(irq::CA1 | irq::CA2);
                self.ira
            }

            reg::ORA_IRA_NH => self.ira,

            reg::DDRB => self.ddrb,
            reg::DDRA => self.ddra,

            reg::T1_C_LO => {
                self.ifr &= !irq::T1;
                self.t1_counter as u8
            }
            reg::T1_C_HI => (self.t1_counter as u16 >> 8) as u8,
            reg::T1_L_LO => self.t1_latch as u8,
            reg::T1_L_HI => (self.t1_latch >> 8) as u8,

            reg::T2_C_LO => {
                self.ifr &= !irq::T2;
                self.t2_counter as u8
            }
            reg::T2_C_HI => (self.t2_counter as u16 >> 8) as u8,

            reg::SR => self.sr,
            reg::ACR => self.acr,
            reg::PCR => self.pcr,

            reg::IFR => {
                let summary = if self.ifr & self.ier & 0x7F != 0 {
                    irq::CTRL
                } else {
                    0
                };
                self.ifr | summary
            }

            reg::IER => self.ier | irq::CTRL,

            _ => unreachable!(),
        }
    }

    /// Advance the timers by `cycles` elapsed bus ticks and run edge
    /// detection on CA1/CB1.
    ///
    /// Returns true iff an enabled interrupt flag is set afterwards —
    /// the level the chip would drive on its IRQ output.
    pub fn tick(&mut self, cycles: u32) -> bool {
        // Timer 1.
        self.t1_counter -= cycles as i32;
        if self.t1_counter <= 0 {
            if self.acr & ACR_T1_FREE_RUN != 0 {
                // Reload from the latch. The -1 +3 reproduces the chip's
                // two-cycle re-arm delay between expiry and restart.
                self.t1_counter += (self.t1_latch as i32 - 1) + 3;
                self.ifr |= irq::T1;
            } else if !self.t1_fired {
                // One-shot: fire once, then free-wheel.
                self.t1_counter += 0xFFFF;
                self.t1_fired = true;
                self.ifr |= irq::T1;
            } else {
                // Already fired: wrap as a plain 16-bit down-counter.
                self.t1_counter = self.t1_counter as u16 as i32;
            }
        }

        // Timer 2 only counts clock cycles; in pulse-count mode it is
        // driven by PB6 edges, which this model does not generate.
        if self.acr & ACR_T2_COUNT_PULSES == 0 {
            self.t2_counter -= cycles as i32;
            if self.t2_counter <= 0 && !self.t2_fired {
                self.t2_counter += 0xFFFF;
                self.t2_fired = true;
                self.ifr |= irq::T2;
            }
        }

        // CA1 edge detection. PCR bit 0 selects the active transition:
        // 1 = low-to-high, 0 = high-to-low.
        if self.ca1 != self.ca1_prev {
            if (self.pcr & 0x01 != 0 && self.ca1) || (self.pcr & 0x01 == 0 && !self.ca1) {
                self.ifr |= irq::CA1;
            }
            self.ca1_prev = self.ca1;
        }

        // CB1, symmetric on PCR bit 4.
        if self.cb1 != self.cb1_prev {
            if (self.pcr & 0x10 != 0 && self.cb1) || (self.pcr & 0x10 == 0 && !self.cb1) {
                self.ifr |= irq::CB1;
            }
            self.cb1_prev = self.cb1;
        }

        self.ifr & self.ier & 0x7F != 0
    }

    // --- Port pins (set by board logic, independent of direction) ---

    /// Drive external levels onto port A. IRA is exactly the pins.
    pub fn set_pa(&mut self, value: u8) {
        self.pa = value;
        self.ira = self.pa;
    }

    /// Drive one external level onto a port A pin.
    pub fn set_pa_bit(&mut self, bit: u8, level: bool) {
        let pa = (self.pa & !(1 << bit)) | (level as u8) << bit;
        self.set_pa(pa);
    }

    /// Stop driving a port A pin: an output bit falls back to ORA, an
    /// input bit is pulled up.
    pub fn release_pa_bit(&mut self, bit: u8) {
        let mask = 1 << bit;
        if self.ddra & mask != 0 {
            self.set_pa_bit(bit, self.ora & mask != 0);
        } else {
            self.set_pa_bit(bit, true);
        }
    }

    /// Drive external levels onto port B. IRB mixes pins (input bits)
    /// with ORB (output bits).
    pub fn set_pb(&mut self, value: u8) {
        self.pb = value;
        self.irb = (self.pb & !self.ddrb) | (self.orb & self.ddrb);
    }

    /// Drive one external level onto a port B pin.
    pub fn set_pb_bit(&mut self, bit: u8, level: bool) {
        let pb = (self.pb & !(1 << bit)) | (level as u8) << bit;
        self.set_pb(pb);
    }

    /// Stop driving a port B pin: an output bit falls back to ORB, an
    /// input bit is pulled up.
    pub fn release_pb_bit(&mut self, bit: u8) {
        let mask = 1 << bit;
        if self.ddrb & mask != 0 {
            self.set_pb_bit(bit, self.orb & mask != 0);
        } else {
            self.set_pb_bit(bit, true);
        }
    }

    pub fn pa(&self) -> u8 {
        self.pa
    }

    pub fn pb(&self) -> u8 {
        self.pb
    }

    // --- Control lines ---

    pub fn set_ca1(&mut self, level: bool) {
        self.ca1_prev = self.ca1;
        self.ca1 = level;
    }

    pub fn set_ca2(&mut self, level: bool) {
        self.ca2 = level;
    }

    pub fn set_cb1(&mut self, level: bool) {
        self.cb1_prev = self.cb1;
        self.cb1 = level;
    }

    pub fn set_cb2(&mut self, level: bool) {
        self.cb2 = level;
    }

    pub fn ca1(&self) -> bool {
        self.ca1
    }

    pub fn ca2(&self) -> bool {
        self.ca2
    }

    pub fn cb1(&self) -> bool {
        self.cb1
    }

    pub fn cb2(&self) -> bool {
        self.cb2
    }
}

impl Default for Via6522 {
    fn default() -> Self {
        Self::new()
    }
}

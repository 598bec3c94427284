use cathode_core::core::mailbox::{MAILBOX_SLOTS, Mailbox};

// ==========================================================================
// FIFO behavior
// ==========================================================================

#[test]
fn test_empty_mailbox_yields_none() {
    let mailbox = Mailbox::new();
    let mut consumer = 0;
    assert_eq!(mailbox.take(&mut consumer), None);
}

#[test]
fn test_entries_come_out_in_post_order() {
    let mailbox = Mailbox::new();
    let mut producer = 0;
    let mut consumer = 0;

    mailbox.post(&mut producer, 0x9110, 0x01);
    mailbox.post(&mut producer, 0x9125, 0x02);
    mailbox.post(&mut producer, 0x9110, 0x03);

    assert_eq!(mailbox.take(&mut consumer), Some((0x9110, 0x01)));
    assert_eq!(mailbox.take(&mut consumer), Some((0x9125, 0x02)));
    assert_eq!(mailbox.take(&mut consumer), Some((0x9110, 0x03)));
    assert_eq!(mailbox.take(&mut consumer), None);
}

#[test]
fn test_entries_are_consumed_exactly_once() {
    let mailbox = Mailbox::new();
    let mut producer = 0;
    let mut consumer = 0;

    mailbox.post(&mut producer, 0x9110, 0x42);
    assert_eq!(mailbox.take(&mut consumer), Some((0x9110, 0x42)));
    assert_eq!(mailbox.take(&mut consumer), None);

    // Interleaved post/take across the same slots
    for i in 0..512u16 {
        mailbox.post(&mut producer, 0x9100 | (i & 0x0F), i as u8);
        assert_eq!(mailbox.take(&mut consumer), Some((0x9100 | (i & 0x0F), i as u8)));
    }
    assert_eq!(mailbox.take(&mut consumer), None);
}

// ==========================================================================
// Overflow
// ==========================================================================

#[test]
fn test_overflow_overwrites_oldest() {
    let mailbox = Mailbox::new();
    let mut producer = 0;
    let mut consumer = 0;

    // Post one full lap plus four without consuming anything
    let total = MAILBOX_SLOTS as u16 + 4;
    for i in 0..total {
        mailbox.post(&mut producer, 0x9100 | (i & 0x0F), i as u8);
    }

    // The second lap overwrote the oldest slots; the consumer sees the
    // overwriting entries first and stops at the producer's terminator
    for i in MAILBOX_SLOTS as u16..total {
        assert_eq!(mailbox.take(&mut consumer), Some((0x9100 | (i & 0x0F), i as u8)));
    }
    assert_eq!(mailbox.take(&mut consumer), None);
}

//! Random source for the AQI noise term.
//!
//! On the device this is the ESP32 hardware RNG (`esp_random`); on the
//! host a seeded `SmallRng`, so simulated runs are reproducible.

use rand::RngCore;

#[cfg(target_os = "espidf")]
pub struct EspRng;

#[cfg(target_os = "espidf")]
impl RngCore for EspRng {
    fn next_u32(&mut self) -> u32 {
        // SAFETY: esp_random has no preconditions.
        unsafe { esp_idf_svc::sys::esp_random() }
    }

    fn next_u64(&mut self) -> u64 {
        (u64::from(self.next_u32()) << 32) | u64::from(self.next_u32())
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let word = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// The platform RNG used by `main`.
#[cfg(target_os = "espidf")]
pub fn platform_rng() -> impl RngCore {
    EspRng
}

#[cfg(not(target_os = "espidf"))]
pub fn platform_rng() -> impl RngCore {
    use rand::SeedableRng;
    rand::rngs::SmallRng::seed_from_u64(0x0E57_1066)
}

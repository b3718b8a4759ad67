use alloy::{primitives::Address, signers::local::PrivateKeySigner};

#[derive(Clone, Debug)]
pub struct TestAccount {
    pub signer: PrivateKeySigner,
}

impl TestAccount {
    pub fn address(&self) -> Address {
        self.signer.address()
    }
}

/// Deterministic sequence of accounts with distinct private keys.
pub struct AccountGenerator {
    id: usize,
}

impl Default for AccountGenerator {
    fn default() -> Self {
        AccountGenerator { id: 100500 }
    }
}

impl AccountGenerator {
    /// Returns the next `N` accounts.
    pub fn accounts<const N: usize>(&mut self) -> [TestAccount; N] {
        std::array::from_fn(|_| self.next().expect("account id space exhausted"))
    }
}

impl Iterator for AccountGenerator {
    type Item = TestAccount;

    fn next(&mut self) -> Option<Self::Item> {
        let mut buffer = [0; 32];

        loop {
            self.id = self.id.checked_add(1)?;

            buffer[24..].copy_from_slice(&self.id.to_be_bytes());
            let Some(signer) = PrivateKeySigner::from_slice(&buffer).ok() else {
                continue;
            };

            break Some(TestAccount { signer });
        }
    }
}

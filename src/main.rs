fn main() {
    rracadm::racadm_run();
}
